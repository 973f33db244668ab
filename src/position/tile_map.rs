use std::fmt;

use rand::Rng;

use crate::position::cell::{Cell, Grid};

/// Dense storage of every cell's tile type. Type 0 marks an empty cell,
/// real tiles use the types `1..=tile_type_count`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    grid: Grid,
    tile_type_count: u8,
    tiles: Box<[u8]>,
}

impl TileMap {
    pub fn new(grid: Grid, tile_type_count: u8) -> Self {
        assert!(tile_type_count > 0, "must have at least one tile type");
        TileMap {
            grid,
            tile_type_count,
            tiles: vec![0; grid.num_cells()].into_boxed_slice(),
        }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn tile_type_count(&self) -> u8 {
        self.tile_type_count
    }

    pub fn tile(&self, cell: Cell) -> u8 {
        self.tiles[self.grid.index_of(cell)]
    }

    pub fn is_empty_cell(&self, cell: Cell) -> bool {
        self.tile(cell) == 0
    }

    pub fn clear(&mut self) {
        self.tiles.fill(0);
    }

    pub fn randomize_tile<R: Rng>(&mut self, cell: Cell, rng: &mut R) {
        self.tiles[self.grid.index_of(cell)] = rng.gen_range(1..=self.tile_type_count);
    }

    pub fn remove_tile(&mut self, cell: Cell) {
        self.tiles[self.grid.index_of(cell)] = 0;
    }

    /// Place a real tile. Emptying a cell goes through [`Self::remove_tile`].
    pub fn set_tile(&mut self, cell: Cell, tile: u8) {
        assert!(
            tile != 0 && tile <= self.tile_type_count,
            "tile type {} out of range",
            tile
        );
        self.tiles[self.grid.index_of(cell)] = tile;
    }

    pub fn swap_tiles(&mut self, lhs: Cell, rhs: Cell) {
        self.tiles
            .swap(self.grid.index_of(lhs), self.grid.index_of(rhs));
    }

    pub fn is_empty_column(&self, column: u16) -> bool {
        (0..self.grid.height()).all(|y| self.is_empty_cell(Cell::new(column, y)))
    }

    pub fn non_empty_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.grid.cells().filter(move |&cell| !self.is_empty_cell(cell))
    }

    pub fn non_empty_count(&self) -> usize {
        self.tiles.iter().filter(|&&tile| tile != 0).count()
    }
}

impl fmt::Display for TileMap {
    /// Renders rows top to bottom, `.` for empty cells.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in (0..self.grid.height()).rev() {
            for x in 0..self.grid.width() {
                let tile = self.tile(Cell::new(x, y));
                if tile == 0 {
                    write!(f, " .")?;
                } else {
                    write!(f, " {}", tile)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
