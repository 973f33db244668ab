//! The search tree itself: an arena of nodes, each wrapping an
//! independent game + scorer pair one move further than its parent.

use log::debug;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::position::{Cell, SameGame};
use crate::scorer::GameScorer;
use crate::search::policy::ExpansionHeuristic;

/// The outcome of one finished line of play: reached once a board has no
/// valid moves left, directly (terminal node) or by random playout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlayoutResult {
    pub total_moves: u32,
    pub total_score: u64,
    pub remaining_tiles: usize,
}

/// Handle to a node in the tree's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

const ROOT: NodeId = NodeId(0);

struct TreeNode {
    game: SameGame,
    scorer: GameScorer,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// The cell selected on the parent's board to reach this state.
    /// `None` only on the root.
    selected_cell: Option<Cell>,
    is_terminal: bool,
    best_child: Option<NodeId>,
    playout: Option<PlayoutResult>,
    /// The random-playout path taken directly from this node. Present
    /// only on simulated leaves; cleared again if the node is expanded.
    simulation_result: Option<Vec<Cell>>,
}

/// Monte Carlo search tree over Same Game states.
///
/// Nodes live in an arena and reference each other by [`NodeId`], keeping
/// ownership acyclic despite the logical parent/child cycle. The tree
/// grows monotonically during one search run and is discarded afterwards.
pub struct SearchTree {
    nodes: Vec<TreeNode>,
    leaf_cache: Option<Vec<NodeId>>,
}

impl SearchTree {
    pub fn new(game: SameGame, scorer: GameScorer) -> Self {
        let mut tree = SearchTree {
            nodes: Vec::new(),
            leaf_cache: None,
        };
        tree.insert_node(game, scorer, None, None);
        tree
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Number of nodes created so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn game(&self, node: NodeId) -> &SameGame {
        &self.nodes[node.index()].game
    }

    pub fn scorer(&self, node: NodeId) -> &GameScorer {
        &self.nodes[node.index()].scorer
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.index()].children
    }

    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.nodes[node.index()].children.is_empty()
    }

    /// A node is terminal iff its board has no valid moves.
    pub fn is_terminal(&self, node: NodeId) -> bool {
        self.nodes[node.index()].is_terminal
    }

    pub fn selected_cell(&self, node: NodeId) -> Option<Cell> {
        self.nodes[node.index()].selected_cell
    }

    /// This node's own terminal result, or the best result found among
    /// its currently known descendants.
    pub fn playout(&self, node: NodeId) -> Option<PlayoutResult> {
        self.nodes[node.index()].playout
    }

    pub fn best_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].best_child
    }

    /// Adds a child wrapping `game` (already one move past the parent's
    /// state), charging `match_size` to a copy of the parent's scorer.
    /// A child born terminal backpropagates its result right away.
    pub fn create_child(
        &mut self,
        parent: NodeId,
        game: SameGame,
        selected_cell: Cell,
        match_size: usize,
    ) -> NodeId {
        assert!(match_size > 0, "child must be created from a valid match");
        let mut scorer = self.nodes[parent.index()].scorer.clone();
        scorer.register_move(match_size);
        self.insert_node(game, scorer, Some(parent), Some(selected_cell))
    }

    /// Grows a non-terminal leaf with the children picked by `heuristic`.
    /// Any previously recorded rollout from this node is superseded.
    pub fn expand(&mut self, leaf: NodeId, heuristic: &dyn ExpansionHeuristic) {
        let node = &mut self.nodes[leaf.index()];
        assert!(
            !node.is_terminal && node.children.is_empty(),
            "only non-terminal leaf nodes can be expanded"
        );
        node.simulation_result = None;

        let candidates = heuristic.candidates(&self.nodes[leaf.index()].game);
        for candidate in candidates {
            self.create_child(
                leaf,
                candidate.game,
                candidate.selected_cell,
                candidate.match_size,
            );
        }
    }

    /// Plays one uniformly random line from this leaf to the end,
    /// recording both the path taken and the final result.
    pub fn simulate<R: Rng>(&mut self, leaf: NodeId, rng: &mut R) {
        let node = &self.nodes[leaf.index()];
        assert!(
            !node.is_terminal && node.children.is_empty(),
            "only non-terminal leaf nodes can be simulated"
        );

        let mut game = node.game.clone();
        let mut scorer = node.scorer.clone();
        let mut path = Vec::new();
        while game.has_valid_moves() {
            let representatives = game.match_representatives();
            let (cell, _) = representatives[rng.gen_range(0..representatives.len())];
            let match_size = game.destroy_matching_tiles_from_cell(cell, &mut ());
            debug_assert!(match_size > 0);
            scorer.register_move(match_size);
            path.push(cell);
        }

        let node = &mut self.nodes[leaf.index()];
        node.simulation_result = Some(path);
        node.playout = Some(PlayoutResult {
            total_moves: scorer.total_moves(),
            total_score: scorer.total_score(),
            remaining_tiles: game.tile_count(),
        });
    }

    /// Walks from a finished leaf toward the root, letting each ancestor
    /// adopt the leaf's line while it improves on the ancestor's best
    /// known one. Stops at the first ancestor that keeps its current
    /// best: nothing further up can be improved either.
    pub fn backpropagate(&mut self, leaf: NodeId) {
        let node = &self.nodes[leaf.index()];
        assert!(
            node.children.is_empty(),
            "backpropagation must start on a leaf node"
        );
        assert!(
            node.playout.is_some(),
            "backpropagation needs a playout result"
        );

        let mut current = leaf;
        while let Some(parent) = self.nodes[current.index()].parent {
            if !self.try_update_best_child(parent, current) {
                break;
            }
            current = parent;
        }
    }

    /// The best line discovered so far: the chain of best children from
    /// the root, finished with the recorded rollout tail where expansion
    /// stopped. Empty if nothing has been searched yet.
    pub fn best_playout_path(&self) -> Vec<Cell> {
        let mut path = Vec::new();
        let mut current = ROOT;
        loop {
            let node = &self.nodes[current.index()];
            if node.is_terminal {
                break;
            }
            if let Some(simulation) = &node.simulation_result {
                path.extend_from_slice(simulation);
                break;
            }
            let Some(best) = node.best_child else {
                break;
            };
            path.push(
                self.nodes[best.index()]
                    .selected_cell
                    .expect("non-root node records its selected cell"),
            );
            current = best;
        }
        path
    }

    /// Current non-terminal leaves, maintained incrementally: cache
    /// entries that gained children since the last call are swapped out
    /// for their own non-terminal descendants instead of rescanning the
    /// whole tree every iteration.
    pub fn non_terminal_leaves(&mut self) -> &[NodeId] {
        let refreshed = match self.leaf_cache.take() {
            None => self.collect_non_terminal_leaves(ROOT),
            Some(cache) => {
                let mut refreshed = Vec::with_capacity(cache.len());
                for id in cache {
                    if self.nodes[id.index()].children.is_empty() {
                        refreshed.push(id);
                    } else {
                        refreshed.extend(self.collect_non_terminal_leaves(id));
                    }
                }
                refreshed
            }
        };
        self.leaf_cache.insert(refreshed)
    }

    /// Iterative traversal; a deep line of forced moves would overflow a
    /// recursive one.
    fn collect_non_terminal_leaves(&self, from: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.index()];
            if node.is_terminal {
                continue;
            }
            if node.children.is_empty() {
                leaves.push(id);
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        leaves
    }

    fn insert_node(
        &mut self,
        game: SameGame,
        scorer: GameScorer,
        parent: Option<NodeId>,
        selected_cell: Option<Cell>,
    ) -> NodeId {
        let is_terminal = !game.has_valid_moves();
        let playout = is_terminal.then(|| PlayoutResult {
            total_moves: scorer.total_moves(),
            total_score: scorer.total_score(),
            remaining_tiles: game.tile_count(),
        });

        let id = NodeId(u32::try_from(self.nodes.len()).expect("tree outgrew the arena index"));
        self.nodes.push(TreeNode {
            game,
            scorer,
            parent,
            children: Vec::new(),
            selected_cell,
            is_terminal,
            best_child: None,
            playout,
            simulation_result: None,
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }

        // A terminal child discovered during expansion updates its
        // ancestors right away instead of waiting for a simulation step.
        if is_terminal && parent.is_some() {
            debug!("created terminal child, backpropagating");
            self.backpropagate(id);
        }
        id
    }

    /// Adopts `child` as the parent's best child if its playout beats the
    /// current best. Lower total score wins: fewer, larger clears.
    fn try_update_best_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let child_playout = self.nodes[child.index()]
            .playout
            .expect("backpropagating child has a playout");
        let parent_node = &self.nodes[parent.index()];
        let adopt = match parent_node.best_child {
            None => true,
            Some(_) => {
                let best = parent_node
                    .playout
                    .expect("a node with a best child has its playout");
                best.total_score > child_playout.total_score
            }
        };
        if adopt {
            let parent_node = &mut self.nodes[parent.index()];
            parent_node.best_child = Some(child);
            parent_node.playout = Some(child_playout);
        }
        adopt
    }
}
