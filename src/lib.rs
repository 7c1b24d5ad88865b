pub mod cli;
pub mod core;
mod logging;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod ui;

pub use crate::core::*;
pub use logging::{init_logging, LOG_ENV};
pub use protocol::{FrameError, Message};
pub use session::{PeerSession, SessionConfig, SessionEvent, SessionHandle};
pub use transport::{
    in_memory::InMemoryTransport, tcp::TcpTransport, PeerReceiver, PeerSender, Transport,
};
