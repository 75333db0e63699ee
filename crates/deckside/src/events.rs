//! Session lifecycle events.

use std::sync::Arc;

use deckside_protocol::GameStateSnapshot;

/// What a session reports on its event channel.
///
/// Events are the push half of the API; the pull half is the synchronous
/// accessors on [`crate::Session`]. A presentation layer that only wants
/// "redraw when something happened" can treat every event the same and
/// read the accessors.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The session loop is running and the join request is on its way.
    Connected,

    /// The server granted (or re-confirmed) this client's resume secret.
    /// The secret itself stays inside the session and its store.
    SecretEstablished,

    /// A new snapshot replaced the game state. The `Arc` is shared with
    /// the session's own copy, so holding it is free.
    StateChanged(Arc<GameStateSnapshot>),

    /// The connection is gone: server close, transport failure, or a
    /// local [`crate::Session::close`]. `reason` is `None` for a clean
    /// local close. This event is never dropped on channel overflow.
    Disconnected { reason: Option<String> },
}
