//! The hand codec.
//!
//! The server broadcasts one snapshot to every client, so each player's
//! hand travels inside it obfuscated: the card list is serialized to
//! JSON, XORed byte-by-byte with the player's secret repeated to length,
//! and base64-encoded with the standard padded alphabet. Only the holder
//! of the matching secret gets valid JSON back out; everyone else
//! decodes noise.
//!
//! This is obfuscation, not encryption. It keeps honest clients from
//! accidentally rendering another player's cards and nothing more.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::DecryptError;
use crate::types::Card;

/// XORs `data` against `key` repeated cyclically.
///
/// Applying the same key twice is the identity, which is why one routine
/// serves both directions. An empty key produces empty output, matching
/// how the server behaves before a secret exists.
fn xor_cycle(data: &[u8], key: &[u8]) -> Vec<u8> {
    data.iter()
        .zip(key.iter().cycle())
        .map(|(byte, key_byte)| byte ^ key_byte)
        .collect()
}

/// Decodes an obfuscated hand with the player's secret.
///
/// An empty payload or an empty secret is the server's way of saying "no
/// hand yet" and decodes to no cards rather than an error. Real failures
/// are deterministic: a wrong secret produces bytes that fail the UTF-8
/// or JSON stage, never a silently wrong hand.
pub fn decode_hand(encoded: &str, secret: &str) -> Result<Vec<Card>, DecryptError> {
    if encoded.is_empty() || secret.is_empty() {
        return Ok(Vec::new());
    }

    let raw = STANDARD.decode(encoded)?;
    let plain = xor_cycle(&raw, secret.as_bytes());
    let text = String::from_utf8(plain)?;
    serde_json::from_str(&text).map_err(DecryptError::Cards)
}

/// Obfuscates a hand the way the server does.
///
/// The client never sends hands, but the inverse operation pins down the
/// exact format in tests and gives test servers something to emit. Keys
/// inside the JSON come out in alphabetical order because the server
/// builds the payload through an ordered map.
pub fn encode_hand(cards: &[Card], secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }

    let text = serde_json::json!(cards).to_string();
    let masked = xor_cycle(text.as_bytes(), secret.as_bytes());
    STANDARD.encode(masked)
}

// ===========================================================================
// Tests
// ===========================================================================
