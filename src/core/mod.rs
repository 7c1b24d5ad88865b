//! Core game model: boards, fleet bookkeeping and the per-peer state
//! machine. Nothing in here performs I/O.

pub mod board;
pub mod common;
pub mod config;
pub mod fleet;
pub mod game;
pub mod ship;

// Re-export commonly used types
pub use board::{Board, Cell};
pub use common::{AttackOutcome, BoardError, Coord};
pub use config::*;
pub use fleet::{FleetStatus, ShipStatus};
pub use game::{
    GameError, GameEvent, GameOutcome, GamePhase, GameSnapshot, GameStateMachine, LocalInput,
    Role, Turn,
};
pub use ship::{Orientation, PlacedShip, ShipDef, ShipId};
