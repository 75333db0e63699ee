//! Session configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default capacity of the event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Default time to wait for the loop to wind down in [`crate::Session::close`].
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Everything needed to join a lobby.
///
/// The endpoint is whatever the deployment says it is (`ws://host:port/ws`
/// in development); nothing is hardcoded here. Builder methods follow the
/// consuming `with_*` convention:
///
/// ```
/// use deckside::SessionConfig;
///
/// let config = SessionConfig::new("ws://localhost:8080/ws", "alice", "kitchen")
///     .with_store_path("/tmp/deckside-identity.json")
///     .with_event_capacity(64);
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// WebSocket URL of the game server.
    pub endpoint: String,
    /// Player name, also the id the server keys state by.
    pub username: String,
    /// The lobby to join (the server calls this the channel).
    pub lobby_code: String,
    /// Where to persist the resume identity. `None` keeps it in memory.
    pub store_path: Option<PathBuf>,
    /// Capacity of the event channel. Clamped to at least 1.
    pub event_capacity: usize,
    /// How long [`crate::Session::close`] waits before aborting the loop.
    pub close_timeout: Duration,
}

impl SessionConfig {
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        lobby_code: impl Into<String>,
    ) -> Self {
        SessionConfig {
            endpoint: endpoint.into(),
            username: username.into(),
            lobby_code: lobby_code.into(),
            store_path: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }

    /// Persists identity at `path` so later sessions can resume.
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    /// Sets the event channel capacity. Zero is bumped to one because a
    /// zero-capacity bounded channel cannot exist.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Sets how long a graceful close waits for the loop.
    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }
}
