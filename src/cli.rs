//! Text-based front-end: reads commands from stdin, feeds them to a session
//! and redraws the board when the snapshot changes.

use tokio::io::{self, AsyncBufReadExt, BufReader};

use crate::core::{common::Coord, config::BOARD_SIZE, game::LocalInput};
use crate::session::SessionHandle;
use crate::ui::{notification, render_snapshot};

/// A parsed line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Input(LocalInput),
    Help,
    Quit,
}

/// Parse a coordinate such as `A5` (column letter, 1-based row).
pub fn parse_coord(input: &str) -> Result<Coord, String> {
    let input = input.trim();
    if input.len() < 2 {
        return Err("Too short - need column letter and row number (e.g., A5)".to_string());
    }
    let mut chars = input.chars();
    let col_ch = chars.next().ok_or("No column letter")?.to_ascii_uppercase();
    if !col_ch.is_ascii_alphabetic() {
        return Err(format!("Invalid column '{}' - must be a letter A-J", col_ch));
    }
    let col = (col_ch as u8).wrapping_sub(b'A');
    if col >= BOARD_SIZE {
        return Err(format!("Column '{}' out of bounds - must be A-J", col_ch));
    }
    let row_str: String = chars.collect();
    let row: u8 = row_str
        .parse()
        .map_err(|_| format!("Invalid row '{}' - must be a number 1-10", row_str))?;
    if row == 0 || row > BOARD_SIZE {
        return Err(format!("Row {} out of bounds - must be 1-10", row));
    }
    Ok(Coord::new(row - 1, col))
}

/// Parse one line of input into a command.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Err("Empty input".to_string());
    };
    let arg = parts.next();
    let command = match (verb.to_ascii_lowercase().as_str(), arg) {
        ("start", None) => Command::Input(LocalInput::Start),
        ("rotate" | "r", None) => Command::Input(LocalInput::ToggleOrientation),
        ("auto", None) => Command::Input(LocalInput::AutoPlace),
        ("place" | "p", Some(at)) => Command::Input(LocalInput::PlaceShip(parse_coord(at)?)),
        ("fire" | "f", Some(at)) => Command::Input(LocalInput::Attack(parse_coord(at)?)),
        ("reset" | "again", None) => Command::Input(LocalInput::Reset),
        ("help" | "?", None) => Command::Help,
        ("quit" | "exit" | "q", None) => Command::Quit,
        ("place" | "p" | "fire" | "f", None) => {
            return Err(format!("'{}' needs a cell, e.g. '{} B3'", verb, verb))
        }
        _ => return Err(format!("Unknown command '{}' - type 'help'", line.trim())),
    };
    if parts.next().is_some() {
        return Err("Too many arguments".to_string());
    }
    Ok(command)
}

const HELP: &str = "\
Commands:
  start          leave the title screen
  place <cell>   place the next ship with its bow at <cell> (e.g. place B3)
  rotate         toggle horizontal / vertical placement
  auto           place the next ship at random
  fire <cell>    attack a cell of the enemy board (e.g. fire C7)
  reset          play again after a game ends
  quit           leave the game";

/// Drive `handle` from stdin until the user quits or the session ends.
pub async fn run_cli(mut handle: SessionHandle) -> anyhow::Result<()> {
    let mut lines = BufReader::new(io::stdin()).lines();
    println!("{}", render_snapshot(&handle.snapshot()));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    handle.exit();
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(Command::Input(input)) => {
                        if handle.input(input).is_err() {
                            break;
                        }
                    }
                    Ok(Command::Help) => println!("{}", HELP),
                    Ok(Command::Quit) => {
                        handle.exit();
                        break;
                    }
                    Err(e) => println!("{}", e),
                }
            }
            changed = handle.snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                while let Ok(event) = handle.events.try_recv() {
                    if let Some(text) = notification(&event) {
                        println!(">> {}", text);
                    }
                }
                let snapshot = handle.snapshots.borrow_and_update().clone();
                println!("{}", render_snapshot(&snapshot));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_corner_coordinates() {
        assert_eq!(parse_coord("A1"), Ok(Coord::new(0, 0)));
        assert_eq!(parse_coord("j10"), Ok(Coord::new(9, 9)));
        assert_eq!(parse_coord(" c7 "), Ok(Coord::new(6, 2)));
    }

    #[test]
    fn rejects_bad_coordinates() {
        assert!(parse_coord("K1").is_err());
        assert!(parse_coord("A0").is_err());
        assert!(parse_coord("A11").is_err());
        assert!(parse_coord("5A").is_err());
        assert!(parse_coord("A").is_err());
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_command("place B3"),
            Ok(Command::Input(LocalInput::PlaceShip(Coord::new(2, 1))))
        );
        assert_eq!(
            parse_command("FIRE e5"),
            Ok(Command::Input(LocalInput::Attack(Coord::new(4, 4))))
        );
        assert_eq!(parse_command("rotate"), Ok(Command::Input(LocalInput::ToggleOrientation)));
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
        assert!(parse_command("fire").is_err());
        assert!(parse_command("start now").is_err());
        assert!(parse_command("dance").is_err());
    }
}
