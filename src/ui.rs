//! Text rendering of boards and notifications.

use std::fmt::Write;

use crate::core::{
    board::{Board, Cell},
    config::BOARD_SIZE,
    game::{GameEvent, GameOutcome, GamePhase, GameSnapshot, Turn},
    ship::Orientation,
};

fn header() -> String {
    let mut out = String::from("    ");
    for c in 0..BOARD_SIZE {
        let _ = write!(out, " {}", (b'A' + c) as char);
    }
    out
}

/// Render `board` as a grid. With `reveal`, unhit ship cells show the first
/// letter of their ship's name; otherwise they look like water.
pub fn render_board(board: &Board, reveal: bool) -> String {
    let mut out = header();
    out.push('\n');
    for (r, row) in board.rows().iter().enumerate() {
        let _ = write!(out, "  {:2}", r + 1);
        for cell in row {
            let ch = match *cell {
                Cell::Hit => 'X',
                Cell::Miss => 'o',
                Cell::ShipPart { ship_id, .. } if reveal => board
                    .ship(ship_id)
                    .and_then(|s| s.name().chars().next())
                    .unwrap_or('S'),
                Cell::ShipPart { .. } | Cell::Water => '.',
            };
            let _ = write!(out, " {}", ch);
        }
        out.push('\n');
    }
    out
}

/// Full screen for the current snapshot.
pub fn render_snapshot(snapshot: &GameSnapshot) -> String {
    let mut out = String::new();
    match snapshot.phase {
        GamePhase::TitleScreen => {
            out.push_str("BROADSIDE\n\nType 'start' to begin placing your fleet.\n");
        }
        GamePhase::PlacingShips => {
            out.push_str("Place your ships\n");
            out.push_str(&render_board(&snapshot.own_board, true));
            if let Some(def) = snapshot.next_ship {
                let orientation = match snapshot.orientation {
                    Orientation::Horizontal => "horizontal",
                    Orientation::Vertical => "vertical",
                };
                let _ = writeln!(
                    out,
                    "Next: {} (length {}), {}. 'place B3', 'rotate' or 'auto'.",
                    def.name(),
                    def.length(),
                    orientation
                );
            }
            if snapshot.opponent_ready {
                out.push_str("Opponent is ready.\n");
            }
        }
        GamePhase::WaitingForOpponent => {
            out.push_str("Waiting for opponent to place ships...\n");
        }
        GamePhase::Playing => {
            out.push_str("Enemy board\n");
            out.push_str(&render_board(&snapshot.enemy_board, false));
            out.push_str("\nYour board\n");
            out.push_str(&render_board(&snapshot.own_board, true));
            if !snapshot.enemy_sunk.is_empty() {
                let _ = writeln!(out, "Sunk: {}", snapshot.enemy_sunk.join(", "));
            }
            let status = match snapshot.turn {
                Turn::Mine => "Your turn: 'fire C7'.",
                Turn::AwaitingResult(_) => "Shot fired, waiting for result...",
                Turn::AwaitingHandOff => "Opponent missed, waiting for hand-off...",
                Turn::Theirs => "Opponent's turn.",
            };
            let _ = writeln!(out, "{}", status);
        }
        GamePhase::GameOver(outcome) => {
            let _ = writeln!(out, "{}", outcome_text(outcome));
            if outcome != GameOutcome::Disconnected {
                out.push_str("Type 'reset' to play again or 'quit' to leave.\n");
            } else {
                out.push_str("Type 'quit' to leave.\n");
            }
        }
    }
    out
}

fn outcome_text(outcome: GameOutcome) -> &'static str {
    match outcome {
        GameOutcome::Won => "You Won!",
        GameOutcome::Lost => "You Lose!",
        GameOutcome::Disconnected => "Opponent disconnected.",
        GameOutcome::Stalled => "Game abandoned: the opponent stopped responding.",
    }
}

/// Short notification for an event, if it deserves one.
pub fn notification(event: &GameEvent) -> Option<String> {
    let text = match event {
        GameEvent::ShotResolved { sunk: Some(name), .. } => format!("You sank their {}!", name),
        GameEvent::ShotResolved { hit: true, .. } => "It's a HIT!".to_string(),
        GameEvent::ShotResolved { hit: false, .. } => "Miss.".to_string(),
        GameEvent::IncomingShot {
            cell,
            sunk: Some(name),
            ..
        } => format!("They sank your {} at {}!", name, cell),
        GameEvent::IncomingShot { cell, hit: true, .. } => format!("They hit you at {}.", cell),
        GameEvent::IncomingShot { cell, hit: false, .. } => format!("They missed at {}.", cell),
        GameEvent::OpponentReady => "Opponent has placed their fleet.".to_string(),
        GameEvent::TurnGained => "Your turn.".to_string(),
        GameEvent::GameOver(outcome) => outcome_text(*outcome).to_string(),
        GameEvent::ResetByPeer => "Opponent started a new game.".to_string(),
        GameEvent::Rejected(reason) => format!("Not allowed: {}", reason),
        GameEvent::PhaseChanged(_)
        | GameEvent::OrientationChanged(_)
        | GameEvent::ShipPlaced { .. }
        | GameEvent::TurnPassed => return None,
    };
    Some(text)
}
