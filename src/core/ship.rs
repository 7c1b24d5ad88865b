//! Ship definitions and placement geometry.

use serde::{Deserialize, Serialize};

use super::common::Coord;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    /// The other orientation.
    pub fn toggled(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// Type of ship: name and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipDef {
    name: &'static str,
    length: usize,
}

impl ShipDef {
    /// Create a new ship definition.
    pub const fn new(name: &'static str, length: usize) -> Self {
        Self { name, length }
    }

    /// Ship's display name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ship's length.
    pub fn length(&self) -> usize {
        self.length
    }
}

/// Identifier handed out by a board for each ship placed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShipId(pub u8);

/// A ship placed on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedShip {
    id: ShipId,
    length: usize,
    origin: Coord,
    orientation: Orientation,
}

impl PlacedShip {
    pub fn new(id: ShipId, length: usize, origin: Coord, orientation: Orientation) -> Self {
        Self {
            id,
            length,
            origin,
            orientation,
        }
    }

    pub fn id(&self) -> ShipId {
        self.id
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn origin(&self) -> Coord {
        self.origin
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Display name, taken from the fleet entry with the same length.
    pub fn name(&self) -> &'static str {
        super::config::FLEET
            .iter()
            .find(|def| def.length() == self.length)
            .map(|def| def.name())
            .unwrap_or("Ship")
    }

    /// Cells covered by this ship.
    pub fn cells(&self) -> impl Iterator<Item = Coord> {
        run_cells(self.origin, self.length, self.orientation)
    }
}

/// Cells of a straight run of `length` starting at `start`. Cells past the
/// grid edge are still yielded (with coordinates >= `BOARD_SIZE`) so callers
/// can reject them; arithmetic saturates rather than wrapping.
pub fn run_cells(start: Coord, length: usize, orientation: Orientation) -> impl Iterator<Item = Coord> {
    (0..length).map(move |i| {
        let step = u8::try_from(i).unwrap_or(u8::MAX);
        match orientation {
            Orientation::Horizontal => Coord::new(start.row, start.col.saturating_add(step)),
            Orientation::Vertical => Coord::new(start.row.saturating_add(step), start.col),
        }
    })
}
