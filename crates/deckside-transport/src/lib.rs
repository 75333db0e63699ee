//! Client transport layer for Deckside.
//!
//! Provides the [`Transport`] trait that abstracts "a connected duplex
//! pipe carrying text frames", plus the default WebSocket implementation.
//! The session layer drives a transport from a single task, which is why
//! the methods take `&mut self` and no locking shows up anywhere here.
//!
//! # Feature Flags
//!
//! - `websocket` (default): the `tokio-tungstenite` client implementation

use std::future::Future;

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::WebSocketTransport;

/// A connected, bidirectional, text-frame transport.
///
/// The methods are spelled `impl Future + Send` rather than `async fn`
/// so that code generic over a transport can still hand the session loop
/// to `tokio::spawn`; a plain `async fn` in a trait makes no promise
/// about the future being `Send`.
pub trait Transport: Send + 'static {
    /// Sends one text frame to the server.
    fn send(&mut self, text: &str) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next text frame.
    ///
    /// Returns `Ok(None)` when the peer closed the connection cleanly.
    /// Control frames never surface here.
    fn recv(&mut self) -> impl Future<Output = Result<Option<String>, TransportError>> + Send;

    /// Closes the connection, flushing a close frame to the peer.
    fn close(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;
}
