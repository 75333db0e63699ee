//! Frame-to-state projection.
//!
//! The projector is the synchronous core of a session: raw frame text in,
//! classified outcome out, no I/O anywhere. The session loop owns the
//! network; accessors on [`crate::Session`] read the projector's fields
//! through a lock. Keeping it pure is what makes the interesting protocol
//! behavior testable without a socket.

use std::sync::Arc;

use serde_json::Value;

use deckside_protocol::{
    decode_hand, Card, GamePhase, GameStateSnapshot, ProtocolError, ServerFrame,
};

/// What applying one inbound frame did.
#[derive(Debug)]
pub(crate) enum Ingested {
    /// The frame carried our resume secret. The caller persists it.
    SecretEstablished(String),
    /// The frame was a snapshot and replaced the game state.
    StateChanged(Arc<GameStateSnapshot>),
    /// The frame was informational; only the message log grew.
    Noted,
}

/// Projection of the server's broadcasts into a client-side view.
pub(crate) struct Projector {
    username: String,
    secret: String,
    state: Option<Arc<GameStateSnapshot>>,
    hand: Vec<Card>,
    log: Vec<Value>,
}

impl Projector {
    pub(crate) fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Projector {
            username: username.into(),
            secret: secret.into(),
            state: None,
            hand: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Applies one raw inbound frame.
    ///
    /// Unparseable JSON is an error and changes nothing. Every frame that
    /// parses lands in the message log, whatever else it turns out to be.
    /// A snapshot replaces the previous one wholesale; there is no
    /// merging, because the server always sends complete states.
    pub(crate) fn ingest(&mut self, raw: &str) -> Result<Ingested, ProtocolError> {
        let value: Value = serde_json::from_str(raw)?;
        self.log.push(value.clone());

        match ServerFrame::classify(value)? {
            ServerFrame::Secret(secret) => {
                self.secret = secret.clone();
                // A snapshot that arrived before the secret was decodable
                // is worth a second look now that we can open hands.
                self.refresh_hand();
                Ok(Ingested::SecretEstablished(secret))
            }
            ServerFrame::Snapshot(snapshot) => {
                let snapshot = Arc::new(*snapshot);
                self.state = Some(Arc::clone(&snapshot));
                self.refresh_hand();
                Ok(Ingested::StateChanged(snapshot))
            }
            ServerFrame::Other(_) => Ok(Ingested::Noted),
        }
    }

    /// Re-decodes our own hand from the current state.
    ///
    /// Decode failures degrade to an empty hand. The cards will be back
    /// in the next snapshot; a bad secret or a garbled payload must never
    /// take the session down.
    fn refresh_hand(&mut self) {
        let encrypted = self
            .state
            .as_deref()
            .and_then(|state| state.player(&self.username))
            .map(|player| player.encrypted_hand.as_str())
            .unwrap_or("");

        self.hand = match decode_hand(encrypted, &self.secret) {
            Ok(cards) => cards,
            Err(e) => {
                tracing::warn!(error = %e, "failed to decode own hand, leaving it empty");
                Vec::new()
            }
        };
    }

    // --- read side ---

    pub(crate) fn state(&self) -> Option<Arc<GameStateSnapshot>> {
        self.state.clone()
    }

    pub(crate) fn phase(&self) -> GamePhase {
        self.state
            .as_deref()
            .map_or(GamePhase::Unknown, GameStateSnapshot::phase)
    }

    /// Advisory turn gate: true iff the server says it is our turn. The
    /// server still validates every command; this only keeps a polite
    /// client from sending commands it knows will bounce.
    pub(crate) fn can_act(&self) -> bool {
        self.state
            .as_deref()
            .is_some_and(|state| state.is_turn(&self.username))
    }

    pub(crate) fn hand(&self) -> Vec<Card> {
        self.hand.clone()
    }

    pub(crate) fn message_log(&self) -> Vec<Value> {
        self.log.clone()
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }
}

// ===========================================================================
// Tests
// ===========================================================================
