//! Integration tests for the WebSocket transport against a real socket.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use deckside_transport::{Transport, TransportError, WebSocketTransport};

// =========================================================================
// Helpers
// =========================================================================

type ServerWs = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

/// Starts a one-connection server that hands the accepted socket to
/// `handler`, and returns the URL to dial.
async fn start_server<F, Fut>(handler: F) -> String
where
    F: FnOnce(ServerWs) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send,
{
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("should have local addr");

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("should accept");
        let ws = tokio_tungstenite::accept_async(stream)
            .await
            .expect("should upgrade");
        handler(ws).await;
    });

    format!("ws://{addr}")
}

/// A free port with nothing listening on it.
async fn unbound_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = listener.local_addr().expect("should have local addr");
    drop(listener);
    format!("ws://{addr}")
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_send_and_recv_roundtrip() {
    let url = start_server(|mut ws| async move {
        while let Some(Ok(msg)) = ws.next().await {
            match msg {
                Message::Text(text) => {
                    let reply = format!("echo:{}", text.as_str());
                    if ws.send(Message::text(reply)).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    })
    .await;

    let mut transport = WebSocketTransport::connect(&url)
        .await
        .expect("should connect");

    transport.send("hello").await.expect("send");
    let reply = transport.recv().await.expect("recv");
    assert_eq!(reply.as_deref(), Some("echo:hello"));

    transport.close().await.expect("close");
}

#[tokio::test]
async fn test_recv_returns_none_on_server_close() {
    let url = start_server(|mut ws| async move {
        ws.send(Message::text("goodbye")).await.expect("send");
        ws.close(None).await.expect("close");
    })
    .await;

    let mut transport = WebSocketTransport::connect(&url)
        .await
        .expect("should connect");

    assert_eq!(
        transport.recv().await.expect("recv").as_deref(),
        Some("goodbye")
    );
    let end = tokio::time::timeout(Duration::from_secs(2), transport.recv())
        .await
        .expect("should not hang")
        .expect("recv");
    assert_eq!(end, None);
}

#[tokio::test]
async fn test_binary_frames_surface_as_text() {
    let url = start_server(|mut ws| async move {
        ws.send(Message::Binary(br#"{"message":"hi"}"#.to_vec().into()))
            .await
            .expect("send");
        // Park until the client hangs up.
        while let Some(Ok(msg)) = ws.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    })
    .await;

    let mut transport = WebSocketTransport::connect(&url)
        .await
        .expect("should connect");

    let frame = transport.recv().await.expect("recv");
    assert_eq!(frame.as_deref(), Some(r#"{"message":"hi"}"#));
}

#[tokio::test]
async fn test_ping_frames_are_skipped() {
    let url = start_server(|mut ws| async move {
        ws.send(Message::Ping(vec![1, 2, 3].into()))
            .await
            .expect("send ping");
        ws.send(Message::text("after-ping")).await.expect("send");
        while let Some(Ok(msg)) = ws.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    })
    .await;

    let mut transport = WebSocketTransport::connect(&url)
        .await
        .expect("should connect");

    // The ping never surfaces; the next text frame does.
    let frame = transport.recv().await.expect("recv");
    assert_eq!(frame.as_deref(), Some("after-ping"));
}

#[tokio::test]
async fn test_connect_to_dead_port_fails() {
    let url = unbound_url().await;
    let result = WebSocketTransport::connect(&url).await;
    assert!(matches!(result, Err(TransportError::ConnectFailed(_))));
}
