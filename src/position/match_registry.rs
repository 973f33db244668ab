use std::collections::HashSet;

use crate::position::cell::{Cell, Grid};
use crate::position::tile_map::TileMap;

/// Index of the matchable groups on a board, built by a union-find pass
/// over all cells.
///
/// Each `map` entry either points at another entry, or holds the negated
/// size of the set it is the root of. Roots of sets containing an empty
/// cell are recorded separately: empty cells all share type 0 and unify
/// with each other, but a region of empty cells is not a playable match.
#[derive(Clone, Debug)]
pub struct MatchRegistry {
    grid: Grid,
    minimum_match_size: usize,
    map: Vec<i32>,
    roots_of_empty: HashSet<usize>,
    biggest_match: usize,
    match_count: usize,
}

impl MatchRegistry {
    pub fn new(grid: Grid, minimum_match_size: usize) -> Self {
        assert!(
            minimum_match_size >= 1,
            "minimum match size must be at least 1"
        );
        MatchRegistry {
            grid,
            minimum_match_size,
            map: vec![-1; grid.num_cells()],
            roots_of_empty: HashSet::new(),
            biggest_match: 0,
            match_count: 0,
        }
    }

    pub fn minimum_match_size(&self) -> usize {
        self.minimum_match_size
    }

    /// Size of the largest qualifying group, 0 if there is none.
    pub fn biggest_match(&self) -> usize {
        self.biggest_match
    }

    /// Number of qualifying groups.
    pub fn match_count(&self) -> usize {
        self.match_count
    }

    pub fn has_valid_moves(&self) -> bool {
        self.match_count > 0
    }

    /// Rebuilds the whole index from the given board. Gravity invalidates
    /// adjacency wholesale, so there is no incremental path.
    pub fn find_matches(&mut self, tiles: &TileMap) {
        self.map.clear();
        self.map.resize(self.grid.num_cells(), -1);
        self.roots_of_empty.clear();
        self.find_disjoint_sets(tiles);
        self.calculate_properties();
    }

    /// All member cells of the group containing `cell`, if that group
    /// qualifies as a match. Scans the whole map; called once per move.
    pub fn try_get_matching_group(&self, cell: Cell) -> Option<Vec<Cell>> {
        if !self.grid.is_valid_cell(cell) {
            return None;
        }
        let target = self.find_root(self.grid.index_of(cell));
        let size = -self.map[target] as usize;
        if self.roots_of_empty.contains(&target) || size < self.minimum_match_size {
            return None;
        }
        Some(
            (0..self.map.len())
                .filter(|&index| self.find_root(index) == target)
                .map(|index| self.grid.cell_at(index))
                .collect(),
        )
    }

    /// One representative cell per qualifying group, with the group size,
    /// in flat-index order.
    pub fn match_representatives(&self) -> Vec<(Cell, usize)> {
        self.map
            .iter()
            .enumerate()
            .filter_map(|(index, &entry)| {
                if entry >= 0 || self.roots_of_empty.contains(&index) {
                    return None;
                }
                let size = -entry as usize;
                (size >= self.minimum_match_size).then(|| (self.grid.cell_at(index), size))
            })
            .collect()
    }

    fn find_disjoint_sets(&mut self, tiles: &TileMap) {
        for x in 0..self.grid.width() {
            for y in 0..self.grid.height() {
                let me = Cell::new(x, y);
                let me_root = self.find_root(self.grid.index_of(me));

                if y + 1 < self.grid.height() {
                    let up = Cell::new(x, y + 1);
                    if tiles.tile(me) == tiles.tile(up) {
                        let up_root = self.find_root(self.grid.index_of(up));
                        self.merge_sets(me_root, up_root);
                    }
                }

                if x + 1 < self.grid.width() {
                    let right = Cell::new(x + 1, y);
                    if tiles.tile(me) == tiles.tile(right) {
                        let right_root = self.find_root(self.grid.index_of(right));
                        self.merge_sets(me_root, right_root);
                    }
                }

                // me_root absorbed both neighbors, so it is still a root
                // here. A later merge can absorb it in turn, leaving a
                // stale entry in roots_of_empty, which is harmless: a
                // former root index never becomes a root again.
                if tiles.is_empty_cell(me) {
                    self.roots_of_empty.insert(me_root);
                }
            }
        }
    }

    fn find_root(&self, index: usize) -> usize {
        let mut root = index;
        while self.map[root] >= 0 {
            root = self.map[root] as usize;
        }
        root
    }

    fn merge_sets(&mut self, root1: usize, root2: usize) {
        if root1 != root2 {
            self.map[root1] += self.map[root2];
            self.map[root2] = root1 as i32;
        }
    }

    fn calculate_properties(&mut self) {
        self.match_count = 0;
        self.biggest_match = 0;
        for (index, &entry) in self.map.iter().enumerate() {
            if entry < 0 && !self.roots_of_empty.contains(&index) {
                let size = -entry as usize;
                if size >= self.minimum_match_size {
                    self.biggest_match = self.biggest_match.max(size);
                    self.match_count += 1;
                }
            }
        }
    }
}
