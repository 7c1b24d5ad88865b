use broadside::{Board, Cell, Coord, Orientation, BOARD_SIZE};
use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};

fn orientation() -> impl Strategy<Value = Orientation> {
    prop_oneof![Just(Orientation::Horizontal), Just(Orientation::Vertical)]
}

/// A board with a few random ships and random attacks applied.
fn random_board(seed: u64) -> Board {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut board = Board::new();
    for length in [5, 4, 3] {
        let (at, o) = board.random_placement(&mut rng, length).unwrap();
        board.place_ship(at, length, o);
    }
    let shots = rng.random_range(0..60);
    for _ in 0..shots {
        let at = Coord::new(
            rng.random_range(0..BOARD_SIZE),
            rng.random_range(0..BOARD_SIZE),
        );
        let _ = board.resolve_attack(at);
    }
    board
}

fn run(start: Coord, length: usize, o: Orientation) -> Vec<(usize, usize)> {
    (0..length)
        .map(|i| match o {
            Orientation::Horizontal => (start.row as usize, start.col as usize + i),
            Orientation::Vertical => (start.row as usize + i, start.col as usize),
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn placement_valid_iff_in_bounds_and_water(
        seed in any::<u64>(),
        row in 0..12u8,
        col in 0..12u8,
        length in 3..=5usize,
        o in orientation(),
    ) {
        let board = random_board(seed);
        let start = Coord::new(row, col);
        let n = BOARD_SIZE as usize;
        let expected = run(start, length, o).into_iter().all(|(r, c)| {
            r < n && c < n && board.rows()[r][c] == Cell::Water
        });
        prop_assert_eq!(board.is_valid_placement(start, length, o), expected);
    }

    #[test]
    fn place_writes_exactly_length_cells_with_one_id(
        row in 0..BOARD_SIZE,
        col in 0..BOARD_SIZE,
        length in 3..=5usize,
        o in orientation(),
    ) {
        let mut board = Board::new();
        let start = Coord::new(row, col);
        prop_assume!(board.is_valid_placement(start, length, o));
        let id = board.place_ship(start, length, o);
        let with_id = board.count(|c| matches!(c, Cell::ShipPart { ship_id, ship_length } if ship_id == id && ship_length == length));
        let any_part = board.count(|c| matches!(c, Cell::ShipPart { .. }));
        prop_assert_eq!(with_id, length);
        prop_assert_eq!(any_part, length);
    }

    #[test]
    fn sunk_iff_every_cell_of_the_ship_is_hit(seed in any::<u64>()) {
        let board = random_board(seed);
        for ship in board.ships() {
            let all_hit = ship.cells().all(|at| board.cell(at) == Some(Cell::Hit));
            prop_assert_eq!(board.is_sunk(ship.id()), all_hit);
        }
        let destroyed = board.count(|c| matches!(c, Cell::ShipPart { .. })) == 0;
        prop_assert_eq!(board.is_fleet_destroyed(), destroyed);
    }

    #[test]
    fn second_attack_on_a_cell_is_refused(
        seed in any::<u64>(),
        row in 0..BOARD_SIZE,
        col in 0..BOARD_SIZE,
    ) {
        let mut board = random_board(seed);
        let at = Coord::new(row, col);
        prop_assume!(board.is_unattacked(at));
        let first = board.resolve_attack(at).unwrap();
        let after = board.clone();
        prop_assert_eq!(
            board.cell(at),
            Some(if first.is_hit() { Cell::Hit } else { Cell::Miss })
        );
        prop_assert!(board.resolve_attack(at).is_err());
        prop_assert_eq!(board, after);
    }
}
