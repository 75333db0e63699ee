//! Outbound game commands.
//!
//! Commands are the only way a client changes game state. Each one names
//! the action, who issued it, and when, wrapped in the envelope the
//! server's dispatcher expects:
//!
//! ```json
//! {
//!   "username": "alice",
//!   "message": {
//!     "action": {"bid": 2},
//!     "origin": {"player": "alice"}
//!   },
//!   "timestamp": "2024-05-11T18:02:34Z"
//! }
//! ```
//!
//! The action set is a closed union. There is deliberately no way to send
//! an arbitrary JSON payload from session code; anything the server can be
//! asked to do has a variant here.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::types::Card;

/// Options for starting a game, sent by the lobby leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartOptions {
    /// How many rounds to play. The server clamps this to what the deck
    /// and player count allow.
    pub rounds: usize,
    /// Ask the server for a seeded shuffle. Only honored in test setups.
    pub deterministic: bool,
}

impl Default for StartOptions {
    fn default() -> Self {
        StartOptions {
            rounds: 9,
            deterministic: false,
        }
    }
}

/// Every action a player can ask the server to perform.
///
/// Tags are lowercased on the wire, so `PlayCard` goes out as
/// `{"playcard": {...}}` and `Deal` as the bare string `"deal"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameAction {
    /// Put a card from the hand on the table. `played_by` must already
    /// name the acting player.
    PlayCard(Card),
    /// Commit to winning this many tricks in the current round.
    Bid(i32),
    /// Acknowledge the current post-trick or post-round pause.
    Ack,
    /// Start the game. Leader only.
    StartGame(StartOptions),
    /// Deal the next round. Leader only.
    Deal,
}

/// Who a command claims to come from.
///
/// The client always stamps `Player(username)`; `System` exists because
/// the server uses the same envelope for bot moves and we parse our own
/// traffic in tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actioner {
    System,
    Player(String),
}

/// The `message` half of the envelope: an action plus its origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandBody {
    pub action: GameAction,
    pub origin: Actioner,
}

/// A complete, timestamped command ready for the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundCommand {
    pub username: String,
    pub message: CommandBody,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl OutboundCommand {
    /// Wraps `action` in a fully stamped envelope for `username`.
    ///
    /// The origin is always the acting player, including for
    /// acknowledgements; the server attributes every command to a seat.
    pub fn new(username: impl Into<String>, action: GameAction) -> Self {
        let username = username.into();
        OutboundCommand {
            message: CommandBody {
                action,
                origin: Actioner::Player(username.clone()),
            },
            username,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Suit;
    use serde_json::json;

    #[test]
    fn test_bid_action_wire_shape() {
        let value = serde_json::to_value(GameAction::Bid(2)).unwrap();
        assert_eq!(value, json!({"bid": 2}));
    }

    #[test]
    fn test_unit_actions_serialize_as_bare_strings() {
        assert_eq!(serde_json::to_value(GameAction::Ack).unwrap(), json!("ack"));
        assert_eq!(
            serde_json::to_value(GameAction::Deal).unwrap(),
            json!("deal")
        );
    }

    #[test]
    fn test_start_game_action_wire_shape() {
        let value = serde_json::to_value(GameAction::StartGame(StartOptions::default())).unwrap();
        assert_eq!(
            value,
            json!({"startgame": {"rounds": 9, "deterministic": false}})
        );
    }

    #[test]
    fn test_play_card_action_wire_shape() {
        let mut card = Card::new(33, Suit::Spade, 7);
        card.played_by = Some("alice".into());
        let value = serde_json::to_value(GameAction::PlayCard(card)).unwrap();
        assert_eq!(
            value,
            json!({"playcard": {"id": 33, "suit": "spade", "value": 7, "played_by": "alice"}})
        );
    }

    #[test]
    fn test_command_envelope_shape() {
        let command = OutboundCommand::new("alice", GameAction::Bid(2));
        let value = serde_json::to_value(&command).unwrap();

        assert_eq!(value["username"], json!("alice"));
        assert_eq!(value["message"]["action"], json!({"bid": 2}));
        assert_eq!(value["message"]["origin"], json!({"player": "alice"}));
        // RFC 3339 with the trailing zone designator, the format the
        // server's timestamp parser accepts.
        let stamp = value["timestamp"].as_str().unwrap();
        assert!(stamp.contains('T'));
        assert!(stamp.ends_with('Z') || stamp.contains('+'));
    }

    #[test]
    fn test_ack_carries_player_origin() {
        let command = OutboundCommand::new("alice", GameAction::Ack);
        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(value["message"]["origin"], json!({"player": "alice"}));
    }

    #[test]
    fn test_timestamp_exact_wire_format() {
        let mut command = OutboundCommand::new("alice", GameAction::Ack);
        command.timestamp = time::macros::datetime!(2024-05-11 18:02:34 UTC);
        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(value["timestamp"], json!("2024-05-11T18:02:34Z"));
    }

    #[test]
    fn test_command_roundtrips() {
        let command = OutboundCommand::new("bob", GameAction::Deal);
        let text = serde_json::to_string(&command).unwrap();
        let back: OutboundCommand = serde_json::from_str(&text).unwrap();
        assert_eq!(back, command);
    }
}
