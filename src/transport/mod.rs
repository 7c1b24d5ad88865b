//! Peer channel: one bidirectional connection carrying [`Message`]s.
//!
//! A transport is split into a sending half, owned by the session loop, and
//! a receiving half, owned by the network-receive task.

use crate::protocol::Message;

/// Sending half of a peer connection.
#[async_trait::async_trait]
pub trait PeerSender: Send {
    /// Send one message. May wait on a full transport buffer.
    async fn send(&mut self, msg: &Message) -> anyhow::Result<()>;

    /// Close the connection for writing; the peer's `recv` then sees the end
    /// of the stream.
    async fn close(&mut self) -> anyhow::Result<()>;
}

/// Receiving half of a peer connection.
#[async_trait::async_trait]
pub trait PeerReceiver: Send {
    /// Wait for the next whole message. `Ok(None)` means the peer closed the
    /// connection cleanly.
    async fn recv(&mut self) -> anyhow::Result<Option<Message>>;
}

/// A connection that can be split into independently owned halves.
pub trait Transport: PeerSender + PeerReceiver {
    type Sender: PeerSender + 'static;
    type Receiver: PeerReceiver + 'static;

    fn split(self) -> (Self::Sender, Self::Receiver);
}

pub mod in_memory;
pub mod tcp;
