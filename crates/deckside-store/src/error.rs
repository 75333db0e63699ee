/// Errors that can occur while persisting identity to disk.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the identity file failed.
    #[error("identity file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The identity failed to serialize. Should not happen with the
    /// plain string fields involved; kept separate so a bug shows up as
    /// itself rather than as an I/O error.
    #[error("identity serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
