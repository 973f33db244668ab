//! An autonomous Same Game solver, based on Monte Carlo Tree Search.
//!
//! Each iteration picks a random non-terminal leaf, grows it with the
//! expansion heuristic, plays one random game to the end from one of the
//! new children, and feeds the outcome back up the tree. The recommended
//! line of play is the chain of best children discovered this way, spliced
//! with the rollout tail where expansion stopped.

use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::position::{Cell, SameGame};
use crate::scorer::GameScorer;

mod policy;
mod tree;

pub use policy::{
    ExhaustiveExpansion, ExpansionCandidate, ExpansionHeuristic, GreedyExpansion,
    RandomLeafSelection, SelectionPolicy,
};
pub use tree::{NodeId, PlayoutResult, SearchTree};

/// Searches for the move sequence that finishes a game with the best
/// playout result. Gives more fine-grained control than the [`run_search`]
/// convenience function.
pub struct BestMovesSearch {
    tree: SearchTree,
    selection: Box<dyn SelectionPolicy>,
    expansion: Box<dyn ExpansionHeuristic>,
    rng: SmallRng,
}

impl BestMovesSearch {
    /// Sets up a search over snapshots of `game` and `scorer` with the
    /// default policies. The originals are never touched by the search.
    pub fn new(game: &SameGame, scorer: &GameScorer) -> Self {
        Self::with_policies(
            game,
            scorer,
            Box::new(RandomLeafSelection),
            Box::new(GreedyExpansion),
        )
    }

    pub fn with_policies(
        game: &SameGame,
        scorer: &GameScorer,
        selection: Box<dyn SelectionPolicy>,
        expansion: Box<dyn ExpansionHeuristic>,
    ) -> Self {
        BestMovesSearch {
            tree: SearchTree::new(game.clone(), scorer.clone()),
            selection,
            expansion,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Reseeds the search's random source, for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Runs up to `iterations` rounds of select, expand, simulate and
    /// backpropagate. Stops early once every line has been played out.
    pub fn perform_search(&mut self, iterations: u32) {
        for iteration in 0..iterations {
            let leaves = self.tree.non_terminal_leaves();
            if leaves.is_empty() {
                debug!("search tree exhausted after {} iterations", iteration);
                break;
            }
            let leaf = self.selection.select(leaves, &mut self.rng);

            self.tree.expand(leaf, self.expansion.as_ref());
            let children = self.tree.children(leaf);
            if children.is_empty() {
                debug!("expansion produced no children, skipping simulation");
                continue;
            }
            let child = children[self.rng.gen_range(0..children.len())];

            // A child born terminal already backpropagated its result
            // when it was created.
            if !self.tree.is_terminal(child) {
                self.tree.simulate(child, &mut self.rng);
                self.tree.backpropagate(child);
            }
        }
    }

    /// The best full line found so far, as cells to select in order.
    pub fn best_move_sequence(&self) -> Vec<Cell> {
        self.tree.best_playout_path()
    }

    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    /// Number of nodes in the search tree.
    pub fn tree_size(&self) -> usize {
        self.tree.len()
    }
}

/// The simplest way to use the search: iterate `iterations` times and
/// return the recommended sequence of cells to select, in order. An empty
/// sequence means nothing was searched (zero budget) or the game is
/// already over.
pub fn run_search(game: &SameGame, scorer: &GameScorer, iterations: u32) -> Vec<Cell> {
    let mut search = BestMovesSearch::new(game, scorer);
    search.perform_search(iterations);
    search.best_move_sequence()
}
