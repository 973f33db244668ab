//! Board compaction after a destroy: tiles fall to the bottom of their
//! column, then whole columns slide left to close fully empty ones.

use crate::position::cell::Cell;
use crate::position::tile_map::TileMap;

/// Computes the moves needed to compact the board, without modifying it.
///
/// Each non-empty cell appears as an origin at most once. A tile that both
/// falls and slides gets a single combined move: column from the
/// horizontal phase, row from the vertical phase. Relative order of tiles
/// is preserved along both axes, and a compacted board produces no moves.
pub fn compact(tiles: &TileMap) -> Vec<(Cell, Cell)> {
    let mut moves = compact_vertically(tiles);
    let horizontal = compact_horizontally(tiles);
    merge_moves(&mut moves, horizontal);
    moves
}

/// Per-column two-pointer compaction: every non-empty cell lands on the
/// row equal to the number of non-empty cells below it.
fn compact_vertically(tiles: &TileMap) -> Vec<(Cell, Cell)> {
    let grid = tiles.grid();
    let mut moves = Vec::new();
    for x in 0..grid.width() {
        let mut write_y = 0;
        for y in 0..grid.height() {
            let cell = Cell::new(x, y);
            if tiles.is_empty_cell(cell) {
                continue;
            }
            if y != write_y {
                moves.push((cell, Cell::new(x, write_y)));
            }
            write_y += 1;
        }
    }
    moves
}

/// Slides non-empty columns left over fully empty ones. Rows refer to the
/// board before vertical compaction; the merge step reconciles the two.
fn compact_horizontally(tiles: &TileMap) -> Vec<(Cell, Cell)> {
    let grid = tiles.grid();
    let mut moves = Vec::new();
    let mut write_x = 0;
    for x in 0..grid.width() {
        if tiles.is_empty_column(x) {
            continue;
        }
        if x != write_x {
            for y in 0..grid.height() {
                let cell = Cell::new(x, y);
                if !tiles.is_empty_cell(cell) {
                    moves.push((cell, Cell::new(write_x, y)));
                }
            }
        }
        write_x += 1;
    }
    moves
}

/// A tile can move in both phases. Such a pair must collapse into one
/// move rather than reporting two contradictory destinations for the same
/// origin cell.
fn merge_moves(vertical: &mut Vec<(Cell, Cell)>, mut horizontal: Vec<(Cell, Cell)>) {
    for (from, to) in vertical.iter_mut() {
        if let Some(index) = horizontal
            .iter()
            .position(|(horizontal_from, _)| horizontal_from == from)
        {
            let (_, horizontal_to) = horizontal.remove(index);
            to.x = horizontal_to.x;
        }
    }
    vertical.append(&mut horizontal);
}
