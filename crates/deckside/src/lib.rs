//! # Deckside
//!
//! Client core for an Oh-Hell-style trick-taking card game.
//!
//! The game itself lives on an authoritative server; this crate is the
//! player's side of the wire. A [`Session`] joins a lobby over WebSocket,
//! keeps the latest full-state snapshot the server broadcasts, opens the
//! player's own obfuscated hand, and offers the handful of commands a
//! player can issue. State changes arrive on an event channel; current
//! state is always readable through synchronous accessors.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use deckside::prelude::*;
//!
//! # async fn run() -> Result<(), DecksideError> {
//! let config = SessionConfig::new("ws://localhost:8080/ws", "alice", "kitchen")
//!     .with_store_path("/tmp/deckside-identity.json");
//! let (session, mut events) = Session::connect(config).await?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         SessionEvent::StateChanged(state) => {
//!             if state.phase() == GamePhase::Bid && session.can_act() {
//!                 session.bid(2)?;
//!             }
//!         }
//!         SessionEvent::Disconnected { .. } => break,
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Layout
//!
//! The workspace splits along the same lines as the runtime:
//!
//! ```text
//! deckside-transport (socket) → deckside-protocol (wire) → deckside (session)
//!                                          deckside-store (resume identity)
//! ```
//!
//! This crate re-exports what a caller needs from all three.

mod config;
mod error;
mod events;
mod projector;
mod session;

pub use config::{SessionConfig, DEFAULT_CLOSE_TIMEOUT, DEFAULT_EVENT_CAPACITY};
pub use error::DecksideError;
pub use events::SessionEvent;
pub use session::Session;

// Re-exported so callers can speak the protocol without naming the
// sub-crates.
pub use deckside_protocol::{
    Card, DecryptError, GameAction, GamePhase, GameStateSnapshot, GameplayState, PlayState,
    PlayerRole, PlayerView, ProtocolError, StartOptions, Suit,
};
pub use deckside_store::{Identity, ResumeStore, StoreError};
pub use deckside_transport::{Transport, TransportError, WebSocketTransport};

/// One-stop imports for typical use.
pub mod prelude {
    pub use crate::{
        Card, DecksideError, GamePhase, GameStateSnapshot, Session, SessionConfig, SessionEvent,
        Suit,
    };
}
