use broadside::protocol::encode;
use broadside::{Coord, Message, PeerReceiver, PeerSender, TcpTransport};
use tokio::io::{duplex, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Duration};

fn attack(row: u8, col: u8) -> Message {
    Message::Attack {
        cell: Coord::new(row, col),
    }
}

#[tokio::test]
async fn test_oversized_length_prefix_is_fatal() -> anyhow::Result<()> {
    let (client, mut server) = duplex(1024);
    let mut transport = TcpTransport::new(client);

    server.write_all(&[0xFF, 0xFF, 0xFF, 0xFF]).await?;
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("too large"), "{}", err);
    Ok(())
}

#[tokio::test]
async fn test_zero_length_frame_is_fatal() -> anyhow::Result<()> {
    let (client, mut server) = duplex(1024);
    let mut transport = TcpTransport::new(client);

    server.write_all(&0u32.to_be_bytes()).await?;
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("Invalid message length"), "{}", err);
    Ok(())
}

#[tokio::test]
async fn test_truncated_frame_is_an_error() -> anyhow::Result<()> {
    let (client, mut server) = duplex(1024);
    let mut transport = TcpTransport::new(client);

    server.write_all(&100u32.to_be_bytes()).await?;
    server.write_all(&[0u8; 10]).await?;
    drop(server);

    let result = timeout(Duration::from_secs(2), transport.recv()).await?;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_partial_length_prefix_is_an_error() -> anyhow::Result<()> {
    let (client, mut server) = duplex(1024);
    let mut transport = TcpTransport::new(client);

    server.write_all(&[0u8, 100]).await?;
    drop(server);

    let result = timeout(Duration::from_secs(2), transport.recv()).await?;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_clean_close_between_frames() -> anyhow::Result<()> {
    let (client, mut server) = duplex(1024);
    let mut transport = TcpTransport::new(client);

    server.write_all(&encode(&Message::Ready)?).await?;
    drop(server);

    assert_eq!(transport.recv().await?, Some(Message::Ready));
    assert_eq!(transport.recv().await?, None);
    Ok(())
}

#[tokio::test]
async fn test_undecodable_payload_is_dropped() -> anyhow::Result<()> {
    let (client, mut server) = duplex(1024);
    let mut transport = TcpTransport::new(client);

    // unknown enum discriminant
    let garbage = [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF];
    server.write_all(&(garbage.len() as u32).to_be_bytes()).await?;
    server.write_all(&garbage).await?;
    server.write_all(&encode(&attack(3, 4))?).await?;

    let msg = timeout(Duration::from_secs(2), transport.recv()).await??;
    assert_eq!(msg, Some(attack(3, 4)));
    Ok(())
}

#[tokio::test]
async fn test_frame_split_across_single_byte_writes() -> anyhow::Result<()> {
    let (client, mut server) = duplex(1024);
    let mut transport = TcpTransport::new(client);
    let msg = Message::Result {
        cell: Coord::new(0, 4),
        hit: true,
        sunk_name: Some("Carrier".to_string()),
        game_over: None,
    };
    let frame = encode(&msg)?;

    let writer = tokio::spawn(async move {
        for byte in frame {
            server.write_all(&[byte]).await?;
            server.flush().await?;
            tokio::task::yield_now().await;
        }
        anyhow::Ok(server)
    });

    assert_eq!(transport.recv().await?, Some(msg));
    writer.await??;
    Ok(())
}

#[tokio::test]
async fn test_batched_frames_are_delivered_in_order() -> anyhow::Result<()> {
    let (client, mut server) = duplex(4096);
    let mut transport = TcpTransport::new(client);

    let sent = vec![Message::Ready, attack(0, 0), Message::TurnChange, Message::Reset];
    let mut bytes = Vec::new();
    for msg in &sent {
        bytes.extend(encode(msg)?);
    }
    server.write_all(&bytes).await?;

    for expected in sent {
        assert_eq!(transport.recv().await?, Some(expected));
    }
    Ok(())
}

#[tokio::test]
async fn test_send_rejects_oversized_message() -> anyhow::Result<()> {
    let (client, _server) = duplex(1024);
    let mut transport = TcpTransport::with_max_message_size(client, 8);
    let msg = Message::Result {
        cell: Coord::new(1, 1),
        hit: true,
        sunk_name: Some("Battleship".to_string()),
        game_over: Some(true),
    };
    let err = transport.send(&msg).await.unwrap_err();
    assert!(err.to_string().contains("too large"), "{}", err);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_length_prefix_over_tcp() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server_task = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await?;
        socket.write_all(&1_000_000_000u32.to_be_bytes()).await?;
        socket.flush().await?;
        tokio::time::sleep(Duration::from_millis(100)).await;
        anyhow::Ok(())
    });

    let mut transport = TcpTransport::new(TcpStream::connect(addr).await?);
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("too large"), "{}", err);

    server_task.await??;
    Ok(())
}
