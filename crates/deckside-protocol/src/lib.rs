//! Wire protocol for Deckside.
//!
//! This crate defines everything that crosses the WebSocket between a
//! client and the game server:
//!
//! - **Types** ([`GameStateSnapshot`], [`Card`], [`GameplayState`],
//!   etc.): the JSON structures the server broadcasts.
//! - **Frames** ([`ServerFrame`]): classification of untagged inbound
//!   messages into secret grants, snapshots, and everything else.
//! - **Commands** ([`OutboundCommand`], [`GameAction`]): the closed set
//!   of actions a client may send, pre-wrapped in the server's envelope.
//! - **Hand codec** ([`decode_hand`], [`encode_hand`]): the XOR/base64
//!   obfuscation that hides each player's cards inside a shared
//!   broadcast.
//!
//! # Architecture
//!
//! Everything here is pure data and pure functions; the only clock use
//! is timestamping outbound commands. The session layer feeds frame text
//! in and ships encoded text out:
//!
//! ```text
//! Transport (text frames) → Protocol (typed frames) → Session (game view)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod command;
mod error;
mod frame;
mod hand;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

// The public API is flat: `deckside_protocol::Card`, not
// `deckside_protocol::types::Card`. The module split is an internal
// reading aid.

pub use command::{Actioner, CommandBody, GameAction, OutboundCommand, StartOptions};
pub use error::{DecryptError, ProtocolError};
pub use frame::{encode, ServerFrame};
pub use hand::{decode_hand, encode_hand};
pub use types::{
    Card, GamePhase, GameStateSnapshot, GameplayState, JoinRequest, PlayState, PlayerRole,
    PlayerView, Suit,
};
