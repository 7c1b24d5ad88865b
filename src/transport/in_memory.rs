use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::protocol::Message;
use crate::transport::{PeerReceiver, PeerSender, Transport};

/// In-process connection, used to wire two sessions together in tests and
/// local play. Messages are delivered whole and in order.
pub struct InMemoryTransport {
    sender: InMemorySender,
    receiver: InMemoryReceiver,
}

pub struct InMemorySender {
    tx: Option<UnboundedSender<Message>>,
}

pub struct InMemoryReceiver {
    rx: UnboundedReceiver<Message>,
}

impl InMemoryTransport {
    /// Two connected ends.
    pub fn pair() -> (Self, Self) {
        let (tx1, rx1) = unbounded_channel();
        let (tx2, rx2) = unbounded_channel();
        (
            Self {
                sender: InMemorySender { tx: Some(tx1) },
                receiver: InMemoryReceiver { rx: rx2 },
            },
            Self {
                sender: InMemorySender { tx: Some(tx2) },
                receiver: InMemoryReceiver { rx: rx1 },
            },
        )
    }
}

#[async_trait::async_trait]
impl PeerSender for InMemorySender {
    async fn send(&mut self, msg: &Message) -> anyhow::Result<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Transport is shut down"))?;
        tx.send(msg.clone())
            .map_err(|_| anyhow::anyhow!("Channel closed"))
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.tx = None;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PeerReceiver for InMemoryReceiver {
    async fn recv(&mut self) -> anyhow::Result<Option<Message>> {
        Ok(self.rx.recv().await)
    }
}

#[async_trait::async_trait]
impl PeerSender for InMemoryTransport {
    async fn send(&mut self, msg: &Message) -> anyhow::Result<()> {
        self.sender.send(msg).await
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.sender.close().await
    }
}

#[async_trait::async_trait]
impl PeerReceiver for InMemoryTransport {
    async fn recv(&mut self) -> anyhow::Result<Option<Message>> {
        self.receiver.recv().await
    }
}

impl Transport for InMemoryTransport {
    type Sender = InMemorySender;
    type Receiver = InMemoryReceiver;

    fn split(self) -> (Self::Sender, Self::Receiver) {
        (self.sender, self.receiver)
    }
}
