#[cfg(test)]
mod board_tests;

#[cfg(test)]
use crate::position::{Cell, Grid, SameGame, TileMap};

/// Builds a board from rows written top to bottom, the way it looks on
/// screen. 0 leaves a cell empty.
#[cfg(test)]
fn tile_map_from_rows(rows: &[&[u8]], tile_type_count: u8) -> TileMap {
    let height = rows.len() as u16;
    let width = rows[0].len() as u16;
    let mut tile_map = TileMap::new(Grid::new(width, height), tile_type_count);
    for (row_index, row) in rows.iter().enumerate() {
        assert_eq!(row.len() as u16, width, "ragged row in test board");
        let y = height - 1 - row_index as u16;
        for (x, &tile) in row.iter().enumerate() {
            if tile != 0 {
                tile_map.set_tile(Cell::new(x as u16, y), tile);
            }
        }
    }
    tile_map
}

#[cfg(test)]
fn game_from_rows(rows: &[&[u8]], tile_type_count: u8, minimum_match_size: usize) -> SameGame {
    SameGame::from_tile_map(tile_map_from_rows(rows, tile_type_count), minimum_match_size)
}
