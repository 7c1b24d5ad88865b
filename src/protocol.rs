//! Messages exchanged between the two peers and their framing on a byte
//! stream.
//!
//! A frame is a 4-byte big-endian payload length followed by the
//! `bincode`-encoded [`Message`]. Zero-length and oversized frames are
//! rejected.

use serde::{Deserialize, Serialize};

use crate::core::common::Coord;
use crate::core::config::MAX_FRAME_LEN;

/// Size of the length prefix in bytes.
pub const FRAME_HEADER_LEN: usize = 4;

/// Messages exchanged between peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Message {
    /// Sender finished placing its fleet.
    Ready,
    /// Fire at a cell of the receiver's board.
    Attack { cell: Coord },
    /// Outcome of the receiver's last attack.
    Result {
        cell: Coord,
        hit: bool,
        sunk_name: Option<String>,
        game_over: Option<bool>,
    },
    /// Sender missed and hands the turn to the receiver.
    TurnChange,
    /// Start a new game with empty boards.
    Reset,
}

impl Message {
    /// Short wire name, used in logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Ready => "ready",
            Message::Attack { .. } => "attack",
            Message::Result { .. } => "result",
            Message::TurnChange => "turn_change",
            Message::Reset => "reset",
        }
    }
}

/// Errors raised while framing or unframing messages.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Message too large: {len} bytes (max: {max})")]
    TooLarge { len: usize, max: u32 },
    #[error("Invalid message length: 0")]
    Empty,
    #[error("Serialization error: {0}")]
    Encode(#[source] bincode::Error),
    #[error("Deserialization error: {0}")]
    Decode(#[source] bincode::Error),
}

/// Encode `msg` into a complete frame (length prefix plus payload).
pub fn encode_frame(msg: &Message, max_len: u32) -> Result<Vec<u8>, FrameError> {
    let payload = bincode::serialize(msg).map_err(FrameError::Encode)?;
    let len = check_len(payload.len(), max_len)?;
    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Validate a length prefix read off the wire.
pub fn decode_header(header: [u8; FRAME_HEADER_LEN], max_len: u32) -> Result<usize, FrameError> {
    let len = u32::from_be_bytes(header);
    check_len(len as usize, max_len).map(|len| len as usize)
}

/// Decode one payload (without its length prefix).
pub fn decode_payload(payload: &[u8]) -> Result<Message, FrameError> {
    bincode::deserialize(payload).map_err(FrameError::Decode)
}

/// Encode with the default frame limit.
pub fn encode(msg: &Message) -> Result<Vec<u8>, FrameError> {
    encode_frame(msg, MAX_FRAME_LEN)
}

fn check_len(len: usize, max_len: u32) -> Result<u32, FrameError> {
    if len == 0 {
        return Err(FrameError::Empty);
    }
    match u32::try_from(len) {
        Ok(len) if len <= max_len => Ok(len),
        _ => Err(FrameError::TooLarge { len, max: max_len }),
    }
}
