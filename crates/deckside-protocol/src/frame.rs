//! Inbound frame classification.
//!
//! The server does not tag its messages. What a frame *is* follows from
//! which fields it carries, in a fixed priority order:
//!
//! 1. a non-empty `client_secret` string makes it a handshake grant,
//!    even if other fields ride along;
//! 2. otherwise a `players` field makes it a game snapshot, and a
//!    snapshot that fails to parse is an error, not a shrug;
//! 3. everything else is informational and kept verbatim.

use serde::Serialize;
use serde_json::Value;

use crate::error::ProtocolError;
use crate::types::GameStateSnapshot;

/// A classified inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerFrame {
    /// The server granted (or re-confirmed) this client's resume secret.
    Secret(String),
    /// A full game-state broadcast.
    Snapshot(Box<GameStateSnapshot>),
    /// Anything else: chat, errors, server notices. Kept as raw JSON for
    /// the message log.
    Other(Value),
}

impl ServerFrame {
    /// Parses raw frame text and classifies it.
    pub fn parse(raw: &str) -> Result<ServerFrame, ProtocolError> {
        let value: Value = serde_json::from_str(raw)?;
        ServerFrame::classify(value)
    }

    /// Classifies an already-parsed JSON value.
    pub fn classify(value: Value) -> Result<ServerFrame, ProtocolError> {
        if let Some(secret) = value.get("client_secret").and_then(Value::as_str) {
            if !secret.is_empty() {
                return Ok(ServerFrame::Secret(secret.to_owned()));
            }
        }

        if value.get("players").is_some() {
            let snapshot: GameStateSnapshot = serde_json::from_value(value)?;
            return Ok(ServerFrame::Snapshot(Box::new(snapshot)));
        }

        Ok(ServerFrame::Other(value))
    }
}

/// Serializes an outbound message to frame text.
pub fn encode<T: Serialize>(message: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(message).map_err(ProtocolError::Encode)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{GameAction, OutboundCommand};
    use crate::types::GamePhase;
    use serde_json::json;

    #[test]
    fn test_secret_frame_classified() {
        let frame = ServerFrame::parse(r#"{"client_secret": "sky_jtdgpafvvg43"}"#).unwrap();
        assert_eq!(frame, ServerFrame::Secret("sky_jtdgpafvvg43".into()));
    }

    #[test]
    fn test_secret_takes_priority_over_players() {
        // A frame carrying both is a handshake grant, never a snapshot.
        let frame = ServerFrame::classify(json!({
            "client_secret": "sky_abc",
            "players": {}
        }))
        .unwrap();
        assert_eq!(frame, ServerFrame::Secret("sky_abc".into()));
    }

    #[test]
    fn test_empty_secret_does_not_count() {
        let frame = ServerFrame::classify(json!({"client_secret": ""})).unwrap();
        assert!(matches!(frame, ServerFrame::Other(_)));
    }

    #[test]
    fn test_snapshot_frame_classified() {
        let frame = ServerFrame::classify(json!({
            "lobby_code": "kitchen",
            "players": {
                "alice": {"id": "alice", "encrypted_hand": "", "num_cards": 0, "role": "Leader"}
            },
            "gameplay_state": "Pregame"
        }))
        .unwrap();

        match frame {
            ServerFrame::Snapshot(snapshot) => {
                assert_eq!(snapshot.lobby_code, "kitchen");
                assert_eq!(snapshot.phase(), GamePhase::Pregame);
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_snapshot_is_malformed() {
        // `players` promises a snapshot; a broken one is an error rather
        // than silently filed under "other".
        let result = ServerFrame::classify(json!({"players": 5}));
        assert!(matches!(result, Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn test_other_frame_passthrough() {
        let frame = ServerFrame::classify(json!({"message": "alice joined"})).unwrap();
        assert_eq!(frame, ServerFrame::Other(json!({"message": "alice joined"})));
    }

    #[test]
    fn test_bare_string_frame_is_other() {
        let frame = ServerFrame::parse(r#""lobby does not exist""#).unwrap();
        assert_eq!(frame, ServerFrame::Other(json!("lobby does not exist")));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let result = ServerFrame::parse("{not json");
        assert!(matches!(result, Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn test_encode_produces_parseable_commands() {
        let command = OutboundCommand::new("alice", GameAction::Bid(1));
        let text = encode(&command).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["message"]["action"], json!({"bid": 1}));
    }
}
