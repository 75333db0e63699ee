//! Protocol-level error types.

use thiserror::Error;

/// Errors from parsing inbound frames or encoding outbound ones.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The server sent something that is not valid JSON, or a frame that
    /// claimed to be a snapshot but did not parse as one.
    #[error("malformed server message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// An outbound value failed to serialize. With the closed command
    /// union this indicates a bug rather than bad input.
    #[error("failed to encode outbound message: {0}")]
    Encode(serde_json::Error),
}

/// Errors from opening an obfuscated hand.
///
/// The variants name the pipeline stage that rejected the payload:
/// base64, then UTF-8, then the card list itself. A wrong secret always
/// fails in one of the last two.
#[derive(Debug, Error)]
pub enum DecryptError {
    /// The payload is not valid base64 in the standard alphabet.
    #[error("hand payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The unmasked bytes are not UTF-8, almost always a wrong secret.
    #[error("unmasked hand is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The unmasked text is not a JSON card list, also a wrong-secret
    /// signature when the text happens to decode as UTF-8.
    #[error("unmasked hand is not a card list: {0}")]
    Cards(serde_json::Error),
}
