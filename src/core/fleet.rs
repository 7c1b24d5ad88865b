//! Fleet bookkeeping derived from board cells.

use super::board::{Board, Cell};
use super::common::BoardError;
use super::ship::ShipId;

/// Per-ship status derived from the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipStatus {
    pub id: ShipId,
    pub name: &'static str,
    pub length: usize,
    pub hits: usize,
    pub sunk: bool,
}

/// Snapshot of every ship on a board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetStatus {
    pub ships: Vec<ShipStatus>,
}

impl FleetStatus {
    /// Derive the status of every placed ship from `board`.
    pub fn of(board: &Board) -> Self {
        let ships = board
            .ships()
            .iter()
            .map(|ship| {
                let remaining = board.count(
                    |c| matches!(c, Cell::ShipPart { ship_id, .. } if ship_id == ship.id()),
                );
                ShipStatus {
                    id: ship.id(),
                    name: ship.name(),
                    length: ship.length(),
                    hits: ship.length() - remaining,
                    sunk: remaining == 0,
                }
            })
            .collect();
        Self { ships }
    }

    /// Ships still afloat.
    pub fn afloat(&self) -> usize {
        self.ships.iter().filter(|s| !s.sunk).count()
    }

    /// `true` when at least one ship was placed and all are sunk.
    pub fn all_sunk(&self) -> bool {
        !self.ships.is_empty() && self.afloat() == 0
    }
}

/// Name of the ship `id` if the latest hit sank it.
pub fn sunk_name(board: &Board, id: ShipId) -> Result<Option<&'static str>, BoardError> {
    let ship = board.ship(id).ok_or(BoardError::UnknownShip(id))?;
    Ok(board.is_sunk(id).then(|| ship.name()))
}
