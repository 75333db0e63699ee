//! Wire types shared with the game server.
//!
//! Everything in this module mirrors the JSON the server actually emits,
//! field for field. The server is the source of truth for the game; the
//! client never computes game logic, it only has to parse these shapes
//! faithfully and tolerate fields it does not understand. That tolerance
//! is expressed with `#[serde(default)]` on everything the client can
//! sensibly default, so a snapshot from a slightly newer server version
//! still parses instead of killing the session.

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use time::OffsetDateTime;

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

/// Card suit, plus the `NoTrump` marker the server uses for rounds played
/// without a trump suit.
///
/// The server spells suits in lowercase on the wire (`"heart"`, `"spade"`,
/// `"notrump"`), which `rename_all = "lowercase"` reproduces exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Heart,
    Diamond,
    Club,
    Spade,
    NoTrump,
}

impl Default for Suit {
    /// A snapshot without a trump field means no trump is in effect.
    fn default() -> Self {
        Suit::NoTrump
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Suit::Heart => "H",
            Suit::Diamond => "D",
            Suit::Club => "C",
            Suit::Spade => "S",
            Suit::NoTrump => "NT",
        };
        f.write_str(s)
    }
}

/// A single playing card as the server represents it.
///
/// `id` is unique within the deck, `value` runs 2 through 14 with aces
/// high. `played_by` is set by the server once the card lands on the
/// table, and by us when we play a card from our own hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: usize,
    pub suit: Suit,
    pub value: i32,
    #[serde(default)]
    pub played_by: Option<String>,
}

impl Card {
    pub fn new(id: usize, suit: Suit, value: i32) -> Self {
        Card {
            id,
            suit,
            value,
            played_by: None,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.suit)
    }
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Progress counters attached to the trick-play phases.
///
/// `hand_num` is the trick currently being played, `hands` the number of
/// tricks in the round. Both default to zero so a payload-less phase tag
/// still produces a usable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayState {
    #[serde(default)]
    pub hand_num: i32,
    #[serde(default)]
    pub hands: i32,
}

/// The server's gameplay phase, exactly as the wire carries it.
///
/// The server serializes this as an externally tagged enum, which means a
/// phase arrives in one of two spellings depending on whether the variant
/// carries a payload:
///
/// ```json
/// "Bid"
/// {"Play": {"hand_num": 2, "hands": 3}}
/// ```
///
/// Derived deserialization would accept both, but it would reject a tag
/// this client has never heard of, and a newer server may well grow one.
/// The hand-written impls below keep the exact wire format for known tags
/// and fold anything unrecognized into [`GameplayState::Unknown`] instead
/// of failing the whole snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameplayState {
    Pregame,
    Bid,
    Play(PlayState),
    PostRound,
    PostHand(PlayState),
    End,
    /// A tag this client does not recognize. Treated as "cannot act".
    Unknown,
}

impl Default for GameplayState {
    fn default() -> Self {
        GameplayState::Unknown
    }
}

impl GameplayState {
    /// Builds a phase from an already-split tag and optional payload.
    ///
    /// A missing or unparseable payload falls back to a zeroed
    /// [`PlayState`] rather than an error. The payload is cosmetic
    /// progress information, not something worth dropping a snapshot over.
    fn from_parts(tag: &str, payload: Option<Value>) -> GameplayState {
        fn play_state(payload: Option<Value>) -> PlayState {
            payload
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default()
        }

        match tag {
            "Pregame" => GameplayState::Pregame,
            "Bid" => GameplayState::Bid,
            "Play" => GameplayState::Play(play_state(payload)),
            "PostRound" => GameplayState::PostRound,
            "PostHand" => GameplayState::PostHand(play_state(payload)),
            "End" => GameplayState::End,
            _ => GameplayState::Unknown,
        }
    }

    /// Collapses the wire phase into the flat [`GamePhase`] the rest of
    /// the client keys its behavior on.
    pub fn phase(&self) -> GamePhase {
        match self {
            GameplayState::Pregame => GamePhase::Pregame,
            GameplayState::Bid => GamePhase::Bid,
            GameplayState::Play(_) => GamePhase::Play,
            GameplayState::PostRound => GamePhase::PostRound,
            GameplayState::PostHand(_) => GamePhase::PostHand,
            GameplayState::End => GamePhase::End,
            GameplayState::Unknown => GamePhase::Unknown,
        }
    }
}

impl Serialize for GameplayState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Unit variants go out as bare strings, payload variants as a
        // single-key object. This matches what the server itself emits.
        match self {
            GameplayState::Pregame => serializer.serialize_str("Pregame"),
            GameplayState::Bid => serializer.serialize_str("Bid"),
            GameplayState::PostRound => serializer.serialize_str("PostRound"),
            GameplayState::End => serializer.serialize_str("End"),
            GameplayState::Unknown => serializer.serialize_str("Unknown"),
            GameplayState::Play(state) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Play", state)?;
                map.end()
            }
            GameplayState::PostHand(state) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("PostHand", state)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for GameplayState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PhaseVisitor;

        impl<'de> Visitor<'de> for PhaseVisitor {
            type Value = GameplayState;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a phase tag string or a single-key phase object")
            }

            fn visit_str<E>(self, tag: &str) -> Result<GameplayState, E>
            where
                E: de::Error,
            {
                Ok(GameplayState::from_parts(tag, None))
            }

            fn visit_unit<E>(self) -> Result<GameplayState, E>
            where
                E: de::Error,
            {
                Ok(GameplayState::Unknown)
            }

            fn visit_map<A>(self, mut map: A) -> Result<GameplayState, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut state = GameplayState::Unknown;
                if let Some(tag) = map.next_key::<String>()? {
                    let payload: Value = map.next_value()?;
                    state = GameplayState::from_parts(&tag, Some(payload));
                }
                // Drain anything after the first entry so the outer
                // deserializer sees a fully consumed map.
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                Ok(state)
            }
        }

        deserializer.deserialize_any(PhaseVisitor)
    }
}

/// Payload-free view of the gameplay phase.
///
/// This is what session code matches on: "is it my turn to bid or play"
/// never depends on the trick counters inside [`GameplayState::Play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamePhase {
    Pregame,
    Bid,
    Play,
    PostRound,
    PostHand,
    End,
    Unknown,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GamePhase::Pregame => "pregame",
            GamePhase::Bid => "bid",
            GamePhase::Play => "play",
            GamePhase::PostRound => "post-round",
            GamePhase::PostHand => "post-hand",
            GamePhase::End => "end",
            GamePhase::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// What a player is to the lobby. `Leader` created it, `Computer` is a
/// server-side bot. Tags are spelled capitalized on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerRole {
    Leader,
    Player,
    Computer,
}

impl Default for PlayerRole {
    fn default() -> Self {
        PlayerRole::Player
    }
}

/// Per-player entry inside a snapshot.
///
/// The server strips private state before broadcasting, so the only hand
/// information here is `encrypted_hand`, an opaque string that each client
/// can open with its own secret (see [`crate::decode_hand`]). For every
/// player but ourselves it decodes to garbage by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub encrypted_hand: String,
    #[serde(default)]
    pub num_cards: i32,
    #[serde(default)]
    pub role: PlayerRole,
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// One full game-state broadcast from the server.
///
/// Snapshots are not diffs. Each one stands alone and wholesale replaces
/// whatever the client held before, so no field here is ever merged with
/// a previous value. Only `players` is required; it is also what
/// identifies a frame as a snapshot in the first place (see
/// [`crate::ServerFrame`]). Everything else defaults so that
/// lobby-stage snapshots, which omit most of the round machinery, parse
/// cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    #[serde(default)]
    pub lobby_code: String,
    pub players: HashMap<String, PlayerView>,
    #[serde(default)]
    pub player_order: Vec<String>,
    #[serde(default)]
    pub curr_round: i32,
    #[serde(default)]
    pub max_rounds: i32,
    #[serde(default)]
    pub cards_to_deal: i32,
    #[serde(default)]
    pub trump: Suit,
    #[serde(default)]
    pub curr_played_cards: Vec<Card>,
    #[serde(default)]
    pub curr_player_turn: Option<String>,
    #[serde(default)]
    pub curr_winning_card: Option<Card>,
    #[serde(default)]
    pub curr_dealer: String,
    #[serde(default)]
    pub bids: HashMap<String, Option<i32>>,
    #[serde(default)]
    pub wins: HashMap<String, i32>,
    #[serde(default)]
    pub score: HashMap<String, i32>,
    #[serde(default)]
    pub gameplay_state: GameplayState,
    #[serde(default)]
    pub system_status: Vec<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl GameStateSnapshot {
    /// The flat phase this snapshot is in.
    pub fn phase(&self) -> GamePhase {
        self.gameplay_state.phase()
    }

    /// Whether it is `username`'s turn according to the server.
    ///
    /// `curr_player_turn` being absent means nobody's turn, so this is
    /// false for everyone between rounds.
    pub fn is_turn(&self, username: &str) -> bool {
        self.curr_player_turn.as_deref() == Some(username)
    }

    /// This player's own entry, if the server knows about them.
    pub fn player(&self, username: &str) -> Option<&PlayerView> {
        self.players.get(username)
    }

    /// The bid `username` has placed this round, if any.
    pub fn bid_of(&self, username: &str) -> Option<i32> {
        self.bids.get(username).copied().flatten()
    }
}

// ---------------------------------------------------------------------------
// Join handshake
// ---------------------------------------------------------------------------

/// First message a client sends after the socket opens.
///
/// `secret` is the resume token from a previous session, or the empty
/// string on a first join. The server treats an unknown username with an
/// empty secret as a fresh player and answers with a new secret; a known
/// username with the right secret reattaches to the seat it held before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub username: String,
    pub channel: String,
    pub secret: String,
}

impl JoinRequest {
    pub fn new(
        username: impl Into<String>,
        channel: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        JoinRequest {
            username: username.into(),
            channel: channel.into(),
            secret: secret.into(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
