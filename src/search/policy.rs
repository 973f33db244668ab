//! Pluggable strategies for the two choice points of the search: which
//! leaf to work on next, and which moves a leaf expands into.

use rand::{Rng, RngCore};

use crate::position::{Cell, SameGame};
use crate::search::tree::NodeId;

/// Picks which non-terminal leaf the next iteration works on.
pub trait SelectionPolicy {
    fn select(&self, leaves: &[NodeId], rng: &mut dyn RngCore) -> NodeId;
}

/// Uniformly random choice among the current non-terminal leaves.
pub struct RandomLeafSelection;

impl SelectionPolicy for RandomLeafSelection {
    fn select(&self, leaves: &[NodeId], rng: &mut dyn RngCore) -> NodeId {
        assert!(!leaves.is_empty(), "cannot select from an empty leaf set");
        leaves[rng.gen_range(0..leaves.len())]
    }
}

/// One candidate child produced by an expansion heuristic: the game state
/// one move past the leaf's, and how it got there.
pub struct ExpansionCandidate {
    pub game: SameGame,
    pub selected_cell: Cell,
    pub match_size: usize,
}

/// Decides which of a board's matches become children when a leaf is
/// expanded. Heuristics are pure over the leaf's game; the tree turns the
/// returned candidates into nodes.
pub trait ExpansionHeuristic {
    fn candidates(&self, game: &SameGame) -> Vec<ExpansionCandidate>;
}

/// Expands every qualifying group.
pub struct ExhaustiveExpansion;

impl ExpansionHeuristic for ExhaustiveExpansion {
    fn candidates(&self, game: &SameGame) -> Vec<ExpansionCandidate> {
        game.match_representatives()
            .into_iter()
            .map(|(cell, _)| play_candidate(game, cell))
            .collect()
    }
}

/// Greedy pruning of the branching factor: keep only the moves that
/// sustain or grow the board's biggest match. When every move shrinks it,
/// the position is degrading no matter what is played, so fall back to
/// expanding every group.
pub struct GreedyExpansion;

impl ExpansionHeuristic for GreedyExpansion {
    fn candidates(&self, game: &SameGame) -> Vec<ExpansionCandidate> {
        let current_biggest = game.biggest_match();
        let (improves, rest): (Vec<ExpansionCandidate>, Vec<ExpansionCandidate>) = game
            .match_representatives()
            .into_iter()
            .map(|(cell, _)| play_candidate(game, cell))
            .partition(|candidate| candidate.game.biggest_match() >= current_biggest);

        if improves.is_empty() {
            rest
        } else {
            improves
        }
    }
}

/// Clones the game and plays the group at `cell`, yielding the state a
/// child node would wrap.
fn play_candidate(game: &SameGame, cell: Cell) -> ExpansionCandidate {
    let mut game = game.clone();
    let match_size = game.destroy_matching_tiles_from_cell(cell, &mut ());
    debug_assert!(match_size > 0, "representative cell must trigger a match");
    ExpansionCandidate {
        game,
        selected_cell: cell,
        match_size,
    }
}
