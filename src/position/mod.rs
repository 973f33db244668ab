//! Same Game board logic: tile storage, match finding, gravity, and the
//! composed game engine.

use std::fmt;

use rand::Rng;

mod cell;
pub mod gravity;
mod match_registry;
mod tile_map;

pub use cell::{Cell, Grid};
pub use match_registry::MatchRegistry;
pub use tile_map::TileMap;

/// Receives board change notifications as they happen, in the order they
/// happen. The view layer animates from these; headless callers pass
/// `&mut ()` to skip them.
pub trait BoardObserver {
    fn tile_created(&mut self, _cell: Cell, _tile_type: u8) {}
    fn tile_destroyed(&mut self, _cell: Cell) {}
    fn tile_moved(&mut self, _from: Cell, _to: Cell) {}
}

/// The null observer.
impl BoardObserver for () {}

/// The Same Game engine: selecting a cell destroys its same-type connected
/// group (if big enough), the remaining tiles fall and slide to close the
/// gap, and the match index is rebuilt for the next move.
///
/// Cloning produces a fully independent game, which the search tree does
/// for every node it creates.
#[derive(Clone, Debug)]
pub struct SameGame {
    tile_map: TileMap,
    match_registry: MatchRegistry,
    tile_count: usize,
    is_initialized: bool,
}

impl SameGame {
    pub fn new(grid: Grid, tile_type_count: u8, minimum_match_size: usize) -> Self {
        SameGame {
            tile_map: TileMap::new(grid, tile_type_count),
            match_registry: MatchRegistry::new(grid, minimum_match_size),
            tile_count: 0,
            is_initialized: false,
        }
    }

    /// Builds an already-initialized game around a prepared board, for
    /// starting from a fixed layout instead of a random fill.
    pub fn from_tile_map(tile_map: TileMap, minimum_match_size: usize) -> Self {
        let mut game = SameGame {
            match_registry: MatchRegistry::new(tile_map.grid(), minimum_match_size),
            tile_map,
            tile_count: 0,
            is_initialized: true,
        };
        game.recalculate_tile_details();
        game
    }

    pub fn grid_size(&self) -> Grid {
        self.tile_map.grid()
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    /// Number of tiles still on the board.
    pub fn tile_count(&self) -> usize {
        self.tile_count
    }

    pub fn minimum_match_size(&self) -> usize {
        self.match_registry.minimum_match_size()
    }

    pub fn tile(&self, cell: Cell) -> u8 {
        self.tile_map.tile(cell)
    }

    pub fn has_valid_moves(&self) -> bool {
        self.match_registry.has_valid_moves()
    }

    /// Size of the largest destroyable group, 0 when the game is over.
    pub fn biggest_match(&self) -> usize {
        self.match_registry.biggest_match()
    }

    /// Number of destroyable groups.
    pub fn match_count(&self) -> usize {
        self.match_registry.match_count()
    }

    /// One representative cell per destroyable group, with the group size.
    pub fn match_representatives(&self) -> Vec<(Cell, usize)> {
        self.match_registry.match_representatives()
    }

    /// Fills every cell with a random tile type and builds the first match
    /// index. Does nothing on an already initialized game.
    pub fn initialize<R: Rng, O: BoardObserver>(&mut self, rng: &mut R, observer: &mut O) {
        if self.is_initialized {
            return;
        }
        for cell in self.grid_size().cells() {
            self.tile_map.randomize_tile(cell, rng);
            observer.tile_created(cell, self.tile_map.tile(cell));
        }
        self.recalculate_tile_details();
        self.is_initialized = true;
    }

    /// Clears the board back to the uninitialized state.
    pub fn reset(&mut self) {
        self.tile_map.clear();
        self.match_registry.find_matches(&self.tile_map);
        self.tile_count = 0;
        self.is_initialized = false;
    }

    /// Destroys the whole group containing `cell` and compacts the board,
    /// returning the number of tiles destroyed.
    ///
    /// Returns 0 without touching the board when `cell` is out of range,
    /// empty, part of a group below the minimum size, or the game is not
    /// initialized yet.
    pub fn destroy_matching_tiles_from_cell<O: BoardObserver>(
        &mut self,
        cell: Cell,
        observer: &mut O,
    ) -> usize {
        if !self.is_initialized {
            return 0;
        }
        let Some(group) = self.match_registry.try_get_matching_group(cell) else {
            return 0;
        };

        for &member in &group {
            self.tile_map.remove_tile(member);
            observer.tile_destroyed(member);
        }

        self.apply_gravity(observer);
        self.recalculate_tile_details();

        group.len()
    }

    /// Applies a compaction plan in two steps, lifting every moving tile
    /// off the board before writing any destination: a destination may be
    /// another move's origin, so in-place application could overwrite a
    /// tile that has not been picked up yet.
    fn apply_gravity<O: BoardObserver>(&mut self, observer: &mut O) {
        let moves = gravity::compact(&self.tile_map);

        let tiles_in_flight: Vec<u8> = moves
            .iter()
            .map(|&(from, _)| self.tile_map.tile(from))
            .collect();
        for &(from, _) in &moves {
            self.tile_map.remove_tile(from);
        }
        for (&(_, to), tile) in moves.iter().zip(tiles_in_flight) {
            self.tile_map.set_tile(to, tile);
        }

        for &(from, to) in &moves {
            observer.tile_moved(from, to);
        }
    }

    fn recalculate_tile_details(&mut self) {
        self.match_registry.find_matches(&self.tile_map);
        self.tile_count = self.tile_map.non_empty_count();
    }
}

impl fmt::Display for SameGame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.tile_map.fmt(f)
    }
}
