use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::position::{BoardObserver, Cell, Grid, SameGame, TileMap};
use crate::tests::game_from_rows;

#[test]
fn initialize_fills_every_cell_within_range() {
    let mut game = SameGame::new(Grid::new(6, 5), 3, 2);
    let mut rng = SmallRng::seed_from_u64(0);
    game.initialize(&mut rng, &mut ());

    assert!(game.is_initialized());
    assert_eq!(game.tile_count(), 30);
    for cell in game.grid_size().cells() {
        let tile = game.tile(cell);
        assert!(tile >= 1 && tile <= 3, "tile {} out of range at {}", tile, cell);
    }
}

#[test]
fn initialize_twice_is_a_no_op() {
    let mut game = SameGame::new(Grid::new(4, 4), 3, 2);
    let mut rng = SmallRng::seed_from_u64(1);
    game.initialize(&mut rng, &mut ());
    let snapshot: Vec<u8> = game.grid_size().cells().map(|cell| game.tile(cell)).collect();

    game.initialize(&mut rng, &mut ());
    let after: Vec<u8> = game.grid_size().cells().map(|cell| game.tile(cell)).collect();
    assert_eq!(snapshot, after);
}

#[test]
fn reset_returns_to_uninitialized() {
    let mut game = SameGame::new(Grid::new(4, 4), 2, 2);
    let mut rng = SmallRng::seed_from_u64(2);
    game.initialize(&mut rng, &mut ());
    assert!(game.tile_count() > 0);

    game.reset();
    assert!(!game.is_initialized());
    assert_eq!(game.tile_count(), 0);
    assert!(!game.has_valid_moves());
}

#[test]
fn destroy_before_initialize_is_a_no_op() {
    let mut game = SameGame::new(Grid::new(4, 4), 1, 1);
    assert_eq!(game.destroy_matching_tiles_from_cell(Cell::new(0, 0), &mut ()), 0);
}

#[test]
fn destroy_out_of_range_cell_is_a_no_op() {
    let mut game = game_from_rows(&[&[1, 1], &[1, 1]], 2, 2);
    assert_eq!(game.destroy_matching_tiles_from_cell(Cell::new(9, 9), &mut ()), 0);
    assert_eq!(game.tile_count(), 4);
}

#[test]
fn destroy_non_matching_cell_is_a_no_op() {
    // The lone 2 in the corner is below the minimum group size.
    let mut game = game_from_rows(&[&[2, 1], &[1, 1]], 2, 2);
    assert_eq!(game.destroy_matching_tiles_from_cell(Cell::new(0, 1), &mut ()), 0);
    assert_eq!(game.tile_count(), 4);
}

#[test]
fn tile_count_is_conserved_through_destroys() {
    let mut game = SameGame::new(Grid::new(8, 8), 3, 2);
    let mut rng = SmallRng::seed_from_u64(3);
    game.initialize(&mut rng, &mut ());

    let mut expected = game.tile_count();
    while game.has_valid_moves() {
        let (cell, size) = game.match_representatives()[0];
        let destroyed = game.destroy_matching_tiles_from_cell(cell, &mut ());
        assert_eq!(destroyed, size);
        expected -= destroyed;
        assert_eq!(game.tile_count(), expected);
    }
}

#[test]
fn tile_map_set_remove_swap() {
    let mut tile_map = TileMap::new(Grid::new(3, 3), 4);
    tile_map.set_tile(Cell::new(0, 0), 2);
    tile_map.set_tile(Cell::new(2, 1), 4);
    assert_eq!(tile_map.tile(Cell::new(0, 0)), 2);
    assert_eq!(tile_map.non_empty_count(), 2);

    tile_map.swap_tiles(Cell::new(0, 0), Cell::new(0, 2));
    assert!(tile_map.is_empty_cell(Cell::new(0, 0)));
    assert_eq!(tile_map.tile(Cell::new(0, 2)), 2);

    tile_map.remove_tile(Cell::new(0, 2));
    assert_eq!(tile_map.non_empty_count(), 1);

    assert!(tile_map.is_empty_column(0));
    assert!(!tile_map.is_empty_column(2));

    tile_map.clear();
    assert_eq!(tile_map.non_empty_count(), 0);
}

#[test]
fn non_empty_cells_iterates_in_flat_index_order() {
    let mut tile_map = TileMap::new(Grid::new(2, 2), 2);
    tile_map.set_tile(Cell::new(1, 0), 1);
    tile_map.set_tile(Cell::new(0, 1), 2);
    let cells: Vec<Cell> = tile_map.non_empty_cells().collect();
    assert_eq!(cells, vec![Cell::new(0, 1), Cell::new(1, 0)]);
}

#[test]
#[should_panic]
fn zero_width_board_is_rejected() {
    Grid::new(0, 5);
}

#[test]
#[should_panic]
fn zero_tile_types_is_rejected() {
    TileMap::new(Grid::new(3, 3), 0);
}

#[test]
#[should_panic]
fn explicitly_setting_a_cell_empty_is_rejected() {
    let mut tile_map = TileMap::new(Grid::new(3, 3), 2);
    tile_map.set_tile(Cell::new(1, 1), 0);
}

#[test]
fn observer_sees_creations_and_destructions() {
    #[derive(Default)]
    struct CountingObserver {
        created: usize,
        destroyed: usize,
        moved: usize,
    }

    impl BoardObserver for CountingObserver {
        fn tile_created(&mut self, _cell: Cell, _tile_type: u8) {
            self.created += 1;
        }
        fn tile_destroyed(&mut self, _cell: Cell) {
            self.destroyed += 1;
        }
        fn tile_moved(&mut self, _from: Cell, _to: Cell) {
            self.moved += 1;
        }
    }

    let mut observer = CountingObserver::default();
    let mut game = SameGame::new(Grid::new(4, 4), 1, 2);
    let mut rng = SmallRng::seed_from_u64(4);
    game.initialize(&mut rng, &mut observer);
    assert_eq!(observer.created, 16);

    // A single tile type means the whole board is one group.
    let destroyed = game.destroy_matching_tiles_from_cell(Cell::new(0, 0), &mut observer);
    assert_eq!(destroyed, 16);
    assert_eq!(observer.destroyed, 16);
    assert_eq!(observer.moved, 0);
}
