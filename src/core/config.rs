use super::ship::ShipDef;

pub const BOARD_SIZE: u8 = 10;
pub const NUM_SHIPS: usize = 3;

/// Ships each player places, in placement order.
pub const FLEET: [ShipDef; NUM_SHIPS] = [
    ShipDef::new("Carrier", 5),
    ShipDef::new("Battleship", 4),
    ShipDef::new("Cruiser", 3),
];

/// Total number of ship segments in a full fleet.
pub const TOTAL_SHIP_CELLS: usize = 5 + 4 + 3;

/// Address the host listens on when none is given.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5555";

/// Address the guest dials when none is given.
pub const DEFAULT_CONNECT_ADDR: &str = "127.0.0.1:5555";

/// Largest payload accepted in a single frame (64 KiB).
pub const MAX_FRAME_LEN: u32 = 64 * 1024;
