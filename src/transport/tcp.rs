use std::io;

use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};

use crate::core::config::MAX_FRAME_LEN;
use crate::protocol::{decode_header, decode_payload, encode_frame, Message, FRAME_HEADER_LEN};
use crate::transport::{PeerReceiver, PeerSender, Transport};

/// Writes length-prefixed frames to a byte stream.
pub struct FrameWriter<W> {
    inner: W,
    max_message_size: u32,
}

/// Reads length-prefixed frames from a byte stream, however the stream
/// splits or batches the bytes.
pub struct FrameReader<R> {
    inner: R,
    max_message_size: u32,
}

/// Framed transport over a stream connection, TCP by default.
pub struct TcpTransport<S = TcpStream> {
    writer: FrameWriter<WriteHalf<S>>,
    reader: FrameReader<ReadHalf<S>>,
}

impl<S> TcpTransport<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    pub fn new(stream: S) -> Self {
        Self::with_max_message_size(stream, MAX_FRAME_LEN)
    }

    pub fn with_max_message_size(stream: S, max_message_size: u32) -> Self {
        let (read, write) = tokio::io::split(stream);
        Self {
            writer: FrameWriter {
                inner: write,
                max_message_size,
            },
            reader: FrameReader {
                inner: read,
                max_message_size,
            },
        }
    }
}

impl TcpTransport<TcpStream> {
    /// Dial the listening peer.
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        info!("connected to {}", stream.peer_addr()?);
        Ok(Self::new(stream))
    }

    /// Listen on `addr` and accept exactly one peer.
    pub async fn listen_once<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("listening on {}", listener.local_addr()?);
        Self::accept(&listener).await
    }

    /// Accept one peer from an already bound listener.
    pub async fn accept(listener: &TcpListener) -> anyhow::Result<Self> {
        let (stream, addr) = listener.accept().await?;
        stream.set_nodelay(true)?;
        info!("peer connected from {}", addr);
        Ok(Self::new(stream))
    }
}

fn write_error(e: io::Error) -> anyhow::Error {
    if e.kind() == io::ErrorKind::BrokenPipe || e.kind() == io::ErrorKind::ConnectionReset {
        anyhow::anyhow!("Connection closed by peer")
    } else {
        anyhow::anyhow!("Write error: {}", e)
    }
}

fn read_error(e: io::Error) -> anyhow::Error {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => anyhow::anyhow!("Connection closed by peer mid-frame"),
        io::ErrorKind::ConnectionReset => anyhow::anyhow!("Connection reset by peer"),
        _ => anyhow::anyhow!("Read error: {}", e),
    }
}

#[async_trait::async_trait]
impl<W> PeerSender for FrameWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, msg: &Message) -> anyhow::Result<()> {
        let frame = encode_frame(msg, self.max_message_size)?;
        self.inner.write_all(&frame).await.map_err(write_error)?;
        self.inner.flush().await.map_err(write_error)?;
        debug!("sent {} ({} bytes)", msg.kind(), frame.len());
        Ok(())
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.inner.shutdown().await.map_err(write_error)
    }
}

impl<R> FrameReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    /// Fill `header`, returning `false` on a clean end of stream before its
    /// first byte.
    async fn read_header(&mut self, header: &mut [u8; FRAME_HEADER_LEN]) -> anyhow::Result<bool> {
        let mut filled = 0;
        while filled < FRAME_HEADER_LEN {
            let n = self.inner.read(&mut header[filled..]).await.map_err(read_error)?;
            if n == 0 {
                if filled == 0 {
                    return Ok(false);
                }
                return Err(anyhow::anyhow!("Connection closed by peer mid-frame"));
            }
            filled += n;
        }
        Ok(true)
    }
}

#[async_trait::async_trait]
impl<R> PeerReceiver for FrameReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn recv(&mut self) -> anyhow::Result<Option<Message>> {
        loop {
            let mut header = [0u8; FRAME_HEADER_LEN];
            if !self.read_header(&mut header).await? {
                debug!("peer closed the connection");
                return Ok(None);
            }

            // A bad length loses the frame boundary, so the stream is unusable.
            let len = decode_header(header, self.max_message_size)?;
            let mut payload = vec![0u8; len];
            self.inner.read_exact(&mut payload).await.map_err(read_error)?;
            match decode_payload(&payload) {
                Ok(msg) => {
                    debug!("received {} ({} bytes)", msg.kind(), len + FRAME_HEADER_LEN);
                    return Ok(Some(msg));
                }
                Err(e) => warn!("dropping malformed {}-byte frame: {}", len, e),
            }
        }
    }
}

#[async_trait::async_trait]
impl<S> PeerSender for TcpTransport<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    async fn send(&mut self, msg: &Message) -> anyhow::Result<()> {
        self.writer.send(msg).await
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.writer.close().await
    }
}

#[async_trait::async_trait]
impl<S> PeerReceiver for TcpTransport<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    async fn recv(&mut self) -> anyhow::Result<Option<Message>> {
        self.reader.recv().await
    }
}

impl<S> Transport for TcpTransport<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    type Sender = FrameWriter<WriteHalf<S>>;
    type Receiver = FrameReader<ReadHalf<S>>;

    fn split(self) -> (Self::Sender, Self::Receiver) {
        (self.writer, self.reader)
    }
}
