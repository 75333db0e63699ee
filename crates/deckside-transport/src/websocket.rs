//! WebSocket transport implementation using `tokio-tungstenite`.

use std::io;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::{Transport, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// A WebSocket [`Transport`] that dials out to a game server.
///
/// Speaks plain `ws://`. The game protocol is all text frames, so binary
/// frames are tolerated only when they decode as UTF-8.
pub struct WebSocketTransport {
    ws: WsStream,
}

impl WebSocketTransport {
    /// Connects to the server at `url`.
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let (ws, response) = connect_async(url).await.map_err(|e| {
            TransportError::ConnectFailed(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                e,
            ))
        })?;
        tracing::info!(url, status = %response.status(), "WebSocket connected");
        Ok(Self { ws })
    }
}

impl Transport for WebSocketTransport {
    async fn send(&mut self, text: &str) -> Result<(), TransportError> {
        self.ws.send(Message::text(text)).await.map_err(|e| {
            TransportError::SendFailed(io::Error::new(io::ErrorKind::BrokenPipe, e))
        })
    }

    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.as_str().to_owned())),
                Some(Ok(Message::Binary(data))) => {
                    let text = String::from_utf8(data.to_vec()).map_err(|e| {
                        TransportError::ReceiveFailed(io::Error::new(
                            io::ErrorKind::InvalidData,
                            e,
                        ))
                    })?;
                    return Ok(Some(text));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        e,
                    )));
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.ws.close(None).await.map_err(|e| {
            TransportError::SendFailed(io::Error::new(io::ErrorKind::BrokenPipe, e))
        })
    }
}
