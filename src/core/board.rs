//! One player's grid: ship placement, attack resolution and the inferred
//! view of the opponent's grid.

use std::fmt;

use log::debug;
use rand::Rng;

use super::common::{AttackOutcome, BoardError, Coord};
use super::config::BOARD_SIZE;
use super::ship::{run_cells, Orientation, PlacedShip, ShipId};

const N: usize = BOARD_SIZE as usize;

/// State of a single grid cell.
///
/// Legal transitions are `Water -> Miss` and `ShipPart -> Hit`, each at most
/// once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Water,
    ShipPart { ship_id: ShipId, ship_length: usize },
    Hit,
    Miss,
}

impl Cell {
    /// `true` once the cell has been attacked.
    pub fn is_revealed(self) -> bool {
        matches!(self, Cell::Hit | Cell::Miss)
    }
}

/// A 10×10 grid of cells plus the ships placed on it.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; N]; N],
    ships: Vec<PlacedShip>,
    next_id: u8,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an all-water board with no ships.
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Water; N]; N],
            ships: Vec::new(),
            next_id: 0,
        }
    }

    /// Cell at `at`, or `None` outside the grid.
    pub fn cell(&self, at: Coord) -> Option<Cell> {
        if at.in_bounds() {
            Some(self.cells[at.row as usize][at.col as usize])
        } else {
            None
        }
    }

    /// Rows of the grid, top to bottom.
    pub fn rows(&self) -> &[[Cell; N]; N] {
        &self.cells
    }

    /// Ships placed so far, in placement order.
    pub fn ships(&self) -> &[PlacedShip] {
        &self.ships
    }

    pub fn ship(&self, id: ShipId) -> Option<&PlacedShip> {
        self.ships.iter().find(|s| s.id() == id)
    }

    /// `true` iff every cell of the run is on the grid and still `Water`.
    pub fn is_valid_placement(&self, start: Coord, length: usize, orientation: Orientation) -> bool {
        length > 0
            && run_cells(start, length, orientation)
                .all(|at| matches!(self.cell(at), Some(Cell::Water)))
    }

    /// Write a ship of `length` into the run starting at `start`.
    ///
    /// The caller must have checked [`Board::is_valid_placement`] first; an
    /// invalid run is a programming error.
    pub fn place_ship(&mut self, start: Coord, length: usize, orientation: Orientation) -> ShipId {
        debug_assert!(
            self.is_valid_placement(start, length, orientation),
            "place_ship called on an invalid run at {start}"
        );
        let id = ShipId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let ship = PlacedShip::new(id, length, start, orientation);
        for at in ship.cells().filter(|at| at.in_bounds()) {
            self.cells[at.row as usize][at.col as usize] = Cell::ShipPart {
                ship_id: id,
                ship_length: length,
            };
        }
        debug!("placed {} ({:?}) at {} {:?}", ship.name(), id, start, orientation);
        self.ships.push(ship);
        id
    }

    /// Validate then place, reporting an invalid run as an error.
    pub fn try_place_ship(
        &mut self,
        start: Coord,
        length: usize,
        orientation: Orientation,
    ) -> Result<ShipId, BoardError> {
        if !self.is_valid_placement(start, length, orientation) {
            return Err(BoardError::InvalidPlacement(start));
        }
        Ok(self.place_ship(start, length, orientation))
    }

    /// Returns a random valid (start, orientation) for a ship of `length`.
    pub fn random_placement<R: Rng>(
        &self,
        rng: &mut R,
        length: usize,
    ) -> Result<(Coord, Orientation), BoardError> {
        if length == 0 || length > N {
            return Err(BoardError::UnableToPlaceShip(length));
        }
        for _ in 0..100 {
            let orientation = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let (max_r, max_c) = match orientation {
                Orientation::Horizontal => (N - 1, N - length),
                Orientation::Vertical => (N - length, N - 1),
            };
            let start = Coord::new(
                rng.random_range(0..=max_r) as u8,
                rng.random_range(0..=max_c) as u8,
            );
            if self.is_valid_placement(start, length, orientation) {
                return Ok((start, orientation));
            }
        }
        // Crowded board: fall back to the first valid run in scan order.
        for orientation in [Orientation::Horizontal, Orientation::Vertical] {
            for row in 0..BOARD_SIZE {
                for col in 0..BOARD_SIZE {
                    let start = Coord::new(row, col);
                    if self.is_valid_placement(start, length, orientation) {
                        return Ok((start, orientation));
                    }
                }
            }
        }
        Err(BoardError::UnableToPlaceShip(length))
    }

    /// Resolve an opponent attack at `at`.
    ///
    /// `ShipPart` becomes `Hit`, `Water` becomes `Miss`. Cells that were
    /// already attacked are rejected and left untouched.
    pub fn resolve_attack(&mut self, at: Coord) -> Result<AttackOutcome, BoardError> {
        let cell = self.cell(at).ok_or(BoardError::OutOfBounds(at))?;
        let slot = &mut self.cells[at.row as usize][at.col as usize];
        match cell {
            Cell::ShipPart { ship_id, .. } => {
                *slot = Cell::Hit;
                Ok(AttackOutcome::Hit(ship_id))
            }
            Cell::Water => {
                *slot = Cell::Miss;
                Ok(AttackOutcome::Miss)
            }
            Cell::Hit | Cell::Miss => Err(BoardError::AlreadyAttacked(at)),
        }
    }

    /// Record the reported outcome of our attack on the opponent's grid.
    /// Only used on the inferred enemy board, which never holds ship parts.
    pub fn record_result(&mut self, at: Coord, hit: bool) -> Result<(), BoardError> {
        let cell = self.cell(at).ok_or(BoardError::OutOfBounds(at))?;
        if cell.is_revealed() {
            return Err(BoardError::AlreadyAttacked(at));
        }
        self.cells[at.row as usize][at.col as usize] = if hit { Cell::Hit } else { Cell::Miss };
        Ok(())
    }

    /// `true` if `at` is on the grid and has not been attacked yet.
    pub fn is_unattacked(&self, at: Coord) -> bool {
        self.cell(at).is_some_and(|c| !c.is_revealed())
    }

    /// `true` iff no cell still holds an unhit part of ship `id`.
    pub fn is_sunk(&self, id: ShipId) -> bool {
        !self
            .cells
            .iter()
            .flatten()
            .any(|c| matches!(c, Cell::ShipPart { ship_id, .. } if *ship_id == id))
    }

    /// `true` iff no unhit ship part remains anywhere on the board.
    pub fn is_fleet_destroyed(&self) -> bool {
        !self
            .cells
            .iter()
            .flatten()
            .any(|c| matches!(c, Cell::ShipPart { .. }))
    }

    /// Number of cells matching `pred`.
    pub fn count(&self, pred: impl Fn(Cell) -> bool) -> usize {
        self.cells.iter().flatten().filter(|c| pred(**c)).count()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{ ships: {:?}", self.ships)?;
        for row in &self.cells {
            let line: String = row
                .iter()
                .map(|c| match c {
                    Cell::Water => '.',
                    Cell::ShipPart { .. } => 'S',
                    Cell::Hit => 'X',
                    Cell::Miss => 'o',
                })
                .collect();
            writeln!(f, "  {line}")?;
        }
        write!(f, "}}")
    }
}
