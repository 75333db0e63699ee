//! Unified error type for the Deckside client.

use deckside_protocol::ProtocolError;
use deckside_store::StoreError;
use deckside_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `deckside` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum DecksideError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, malformed message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An identity-store error (I/O, serialization).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A command was issued while the session had no live connection.
    #[error("session is not connected")]
    NotConnected,
}
