//! Common types for the board: coordinates, board errors and attack outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::BOARD_SIZE;
use super::ship::ShipId;

/// A cell on the 10×10 grid, addressed by row then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: u8,
    pub col: u8,
}

impl Coord {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Returns `true` if the coordinate lies inside the grid.
    pub fn in_bounds(self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }
}

impl fmt::Display for Coord {
    /// Formats as column letter then 1-based row, e.g. `(2, 4)` is `E3`.
    /// Off-grid coordinates print as `(row, col)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.in_bounds() {
            return write!(f, "({}, {})", self.row, self.col);
        }
        let col = (b'A' + self.col) as char;
        write!(f, "{}{}", col, self.row as u16 + 1)
    }
}

/// Result of resolving an attack against a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    /// The cell held part of the given ship and is now `Hit`.
    Hit(ShipId),
    /// The cell was open water and is now `Miss`.
    Miss,
}

impl AttackOutcome {
    pub fn is_hit(self) -> bool {
        matches!(self, AttackOutcome::Hit(_))
    }
}

/// Errors returned by Board operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("coordinate {0:?} is outside the board")]
    OutOfBounds(Coord),
    #[error("ship placement at {0} leaves the board or overlaps another ship")]
    InvalidPlacement(Coord),
    #[error("cell {0} was already attacked")]
    AlreadyAttacked(Coord),
    #[error("no ship with id {0:?} on this board")]
    UnknownShip(ShipId),
    #[error("no placement left for a ship of length {0}")]
    UnableToPlaceShip(usize),
}
