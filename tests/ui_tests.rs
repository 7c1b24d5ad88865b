use broadside::ui::{notification, render_board, render_snapshot};
use broadside::{
    Board, Coord, GameEvent, GameOutcome, GameStateMachine, LocalInput, Orientation, Role,
};

#[test]
fn test_render_board_hides_ships_unless_revealed() {
    let mut board = Board::new();
    board.place_ship(Coord::new(0, 0), 3, Orientation::Horizontal);
    board.resolve_attack(Coord::new(0, 1)).unwrap();
    board.resolve_attack(Coord::new(5, 5)).unwrap();

    let shown = render_board(&board, true);
    let first_row = shown.lines().nth(1).unwrap();
    assert!(first_row.starts_with("   1"));
    assert!(first_row.contains("C X C"));

    let hidden = render_board(&board, false);
    let first_row = hidden.lines().nth(1).unwrap();
    assert!(first_row.contains(". X ."));
    assert!(hidden.lines().skip(1).all(|l| !l.contains('C')));
    assert!(hidden.lines().nth(6).unwrap().contains('o'));
}

#[test]
fn test_render_snapshot_follows_phase() {
    let mut m = GameStateMachine::new(Role::Host);
    assert!(render_snapshot(&m.snapshot()).contains("start"));
    m.handle_input(LocalInput::Start).unwrap();
    let screen = render_snapshot(&m.snapshot());
    assert!(screen.contains("Carrier (length 5), horizontal"));
    m.handle_disconnect();
    assert!(render_snapshot(&m.snapshot()).contains("Opponent disconnected."));
}

#[test]
fn test_notifications() {
    assert_eq!(
        notification(&GameEvent::ShotResolved {
            cell: Coord::new(0, 0),
            hit: true,
            sunk: None
        })
        .as_deref(),
        Some("It's a HIT!")
    );
    assert_eq!(
        notification(&GameEvent::ShotResolved {
            cell: Coord::new(0, 0),
            hit: true,
            sunk: Some("Cruiser".to_string())
        })
        .as_deref(),
        Some("You sank their Cruiser!")
    );
    assert_eq!(
        notification(&GameEvent::IncomingShot {
            cell: Coord::new(2, 4),
            hit: false,
            sunk: None
        })
        .as_deref(),
        Some("They missed at E3.")
    );
    assert_eq!(
        notification(&GameEvent::GameOver(GameOutcome::Won)).as_deref(),
        Some("You Won!")
    );
    assert_eq!(notification(&GameEvent::TurnPassed), None);
}
