//! The session: one lobby membership, one connection, one task.
//!
//! A [`Session`] owns everything that belongs to a single player's seat
//! at a single table: the transport, the projector, and the identity
//! store. Nothing is global, so one process can hold seats in several
//! lobbies at once. The loop is a single task that multiplexes outbound
//! commands against inbound frames; frames are applied strictly in
//! arrival order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use deckside_protocol::{
    encode, Card, GameAction, GamePhase, GameStateSnapshot, JoinRequest, OutboundCommand,
    StartOptions,
};
use deckside_store::{Identity, ResumeStore};
use deckside_transport::{Transport, WebSocketTransport};

use crate::config::SessionConfig;
use crate::error::DecksideError;
use crate::events::SessionEvent;
use crate::projector::{Ingested, Projector};

/// What the handle sends to the loop.
enum Command {
    /// Ship this pre-encoded frame to the server.
    Send(String),
    /// Close the transport and stop.
    Close,
}

/// State shared between the handle and the loop.
struct Shared {
    username: String,
    lobby_code: String,
    connected: AtomicBool,
    projector: Mutex<Projector>,
}

impl Shared {
    /// The projector lock is only ever held for synchronous work, so a
    /// poisoned lock just means a panic already happened elsewhere;
    /// taking the data as-is is safe.
    fn projector(&self) -> MutexGuard<'_, Projector> {
        self.projector.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to a running game session.
///
/// Constructed with [`Session::connect`] (real WebSocket) or
/// [`Session::start`] (any [`Transport`], which is how tests drive a
/// session with a scripted peer). Game commands are synchronous and
/// cheap: they encode the command and queue it for the loop. State reads
/// are synchronous too, served from the projector under a lock.
///
/// Dropping the handle without calling [`Session::close`] aborts the
/// loop task.
pub struct Session {
    shared: Arc<Shared>,
    cmd_tx: mpsc::UnboundedSender<Command>,
    task: Option<JoinHandle<()>>,
    close_timeout: Duration,
}

impl Session {
    /// Connects to `config.endpoint` and starts the session.
    ///
    /// The store comes from `config.store_path`, or lives in memory when
    /// no path was given.
    pub async fn connect(
        config: SessionConfig,
    ) -> Result<(Session, mpsc::Receiver<SessionEvent>), DecksideError> {
        let transport = WebSocketTransport::connect(&config.endpoint).await?;
        let store = match &config.store_path {
            Some(path) => ResumeStore::open(path),
            None => ResumeStore::ephemeral(),
        };
        Session::start(transport, store, config)
    }

    /// Starts a session over an already-connected transport.
    ///
    /// Must be called within a Tokio runtime; the loop is spawned here.
    /// The join request goes out as the loop's first send, with the
    /// store's resume secret if one is on file for this exact username
    /// and lobby. A secret minted for some other membership is not
    /// replayed; the store is reset and the join goes out fresh.
    pub fn start(
        transport: impl Transport,
        mut store: ResumeStore,
        config: SessionConfig,
    ) -> Result<(Session, mpsc::Receiver<SessionEvent>), DecksideError> {
        let secret = if store
            .identity()
            .matches(&config.username, &config.lobby_code)
        {
            store.identity().secret.clone()
        } else {
            if !store.identity().is_empty() {
                tracing::info!(
                    username = %config.username,
                    lobby = %config.lobby_code,
                    "stored identity belongs to a different membership, starting fresh"
                );
                if let Err(e) = store.replace(Identity::default()) {
                    tracing::warn!(error = %e, "failed to reset identity store");
                }
            }
            String::new()
        };

        // Username and lobby are known before the server says anything,
        // so they are persisted at join time; the secret follows when
        // the handshake completes. Store trouble is never fatal.
        if let Err(e) = store.save(Identity {
            username: config.username.clone(),
            lobby_code: config.lobby_code.clone(),
            secret: String::new(),
        }) {
            tracing::warn!(error = %e, "failed to persist identity at join");
        }

        let join = JoinRequest::new(&config.username, &config.lobby_code, &secret);
        let join_text = encode(&join)?;

        let shared = Arc::new(Shared {
            username: config.username.clone(),
            lobby_code: config.lobby_code.clone(),
            connected: AtomicBool::new(false),
            projector: Mutex::new(Projector::new(&config.username, secret)),
        });

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(config.event_capacity.max(1));

        let task = tokio::spawn(run_loop(
            transport,
            store,
            Arc::clone(&shared),
            cmd_rx,
            event_tx,
            join_text,
        ));

        let session = Session {
            shared,
            cmd_tx,
            task: Some(task),
            close_timeout: config.close_timeout,
        };
        Ok((session, event_rx))
    }

    // --- accessors ---

    /// Whether the loop currently holds a live connection.
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    pub fn username(&self) -> &str {
        &self.shared.username
    }

    pub fn lobby_code(&self) -> &str {
        &self.shared.lobby_code
    }

    /// The latest snapshot, if any has arrived.
    pub fn state(&self) -> Option<Arc<GameStateSnapshot>> {
        self.shared.projector().state()
    }

    /// The normalized phase, `Unknown` before the first snapshot.
    pub fn phase(&self) -> GamePhase {
        self.shared.projector().phase()
    }

    /// Advisory turn gate: true iff the server says it is our turn. The
    /// server revalidates every command regardless.
    pub fn can_act(&self) -> bool {
        self.shared.projector().can_act()
    }

    /// Our own decoded hand from the latest snapshot.
    pub fn hand(&self) -> Vec<Card> {
        self.shared.projector().hand()
    }

    /// Every parsed inbound frame, in arrival order.
    pub fn message_log(&self) -> Vec<Value> {
        self.shared.projector().message_log()
    }

    // --- commands ---

    /// Asks the server to start the game. Lobby leader only.
    pub fn start_game(&self, rounds: usize, deterministic: bool) -> Result<(), DecksideError> {
        self.send_action(GameAction::StartGame(StartOptions {
            rounds,
            deterministic,
        }))
    }

    /// Asks the server to deal the next round. Dealer only.
    pub fn deal(&self) -> Result<(), DecksideError> {
        self.send_action(GameAction::Deal)
    }

    /// Bids for the current round.
    pub fn bid(&self, value: i32) -> Result<(), DecksideError> {
        self.send_action(GameAction::Bid(value))
    }

    /// Plays a card from the hand. The card is stamped as played by this
    /// session's player, whatever `played_by` said before.
    pub fn play_card(&self, mut card: Card) -> Result<(), DecksideError> {
        card.played_by = Some(self.shared.username.clone());
        self.send_action(GameAction::PlayCard(card))
    }

    /// Acknowledges the current post-trick or post-round pause.
    pub fn ack(&self) -> Result<(), DecksideError> {
        self.send_action(GameAction::Ack)
    }

    /// Encodes `action` and queues it for the loop: one send attempt,
    /// no retry, no queue-for-later while disconnected.
    fn send_action(&self, action: GameAction) -> Result<(), DecksideError> {
        if !self.is_connected() {
            tracing::warn!("dropping command, session is not connected");
            return Err(DecksideError::NotConnected);
        }
        let command = OutboundCommand::new(self.shared.username.as_str(), action);
        let text = encode(&command)?;
        self.cmd_tx
            .send(Command::Send(text))
            .map_err(|_| DecksideError::NotConnected)
    }

    /// Closes the session gracefully.
    ///
    /// Signals the loop to close the transport and waits up to the
    /// configured close timeout for it to finish, aborting it if it does
    /// not. Idempotent; commands after this return
    /// [`DecksideError::NotConnected`].
    pub async fn close(&mut self) {
        let _ = self.cmd_tx.send(Command::Close);
        if let Some(task) = self.task.take() {
            let abort = task.abort_handle();
            match tokio::time::timeout(self.close_timeout, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!(error = %e, "session loop ended abnormally"),
                Err(_) => {
                    tracing::warn!("session loop did not stop in time, aborting it");
                    abort.abort();
                    self.shared.connected.store(false, Ordering::SeqCst);
                }
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// The loop
// ---------------------------------------------------------------------------

async fn run_loop(
    mut transport: impl Transport,
    mut store: ResumeStore,
    shared: Arc<Shared>,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: mpsc::Sender<SessionEvent>,
    join_text: String,
) {
    shared.connected.store(true, Ordering::SeqCst);
    emit(&event_tx, SessionEvent::Connected);

    // None = clean local close; otherwise why the connection ended.
    let mut reason: Option<String> = None;

    if let Err(e) = transport.send(&join_text).await {
        tracing::warn!(error = %e, "failed to send join request");
        reason = Some(e.to_string());
    } else {
        tracing::debug!(lobby = %shared.lobby_code, "join request sent");
        loop {
            tokio::select! {
                command = cmd_rx.recv() => match command {
                    Some(Command::Send(text)) => {
                        if let Err(e) = transport.send(&text).await {
                            tracing::warn!(error = %e, "send failed, ending session");
                            reason = Some(e.to_string());
                            break;
                        }
                    }
                    // Close requested, or every handle is gone.
                    Some(Command::Close) | None => {
                        if let Err(e) = transport.close().await {
                            tracing::debug!(error = %e, "close handshake failed");
                        }
                        break;
                    }
                },
                frame = transport.recv() => match frame {
                    Ok(Some(text)) => {
                        apply_frame(&shared, &mut store, &event_tx, &text);
                    }
                    Ok(None) => {
                        tracing::info!("server closed the connection");
                        reason = Some("closed by peer".into());
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "receive failed, ending session");
                        reason = Some(e.to_string());
                        break;
                    }
                },
            }
        }
    }

    shared.connected.store(false, Ordering::SeqCst);
    // Disconnected must reach the caller even when the channel is full,
    // so it alone uses a waiting send instead of `emit`.
    let _ = event_tx.send(SessionEvent::Disconnected { reason }).await;
}

/// Runs one inbound frame through the projector and acts on the outcome.
fn apply_frame(
    shared: &Shared,
    store: &mut ResumeStore,
    event_tx: &mpsc::Sender<SessionEvent>,
    text: &str,
) {
    let outcome = shared.projector().ingest(text);
    match outcome {
        Ok(Ingested::SecretEstablished(secret)) => {
            tracing::info!("resume secret established");
            if let Err(e) = store.save(Identity {
                secret,
                ..Default::default()
            }) {
                tracing::warn!(error = %e, "failed to persist resume secret");
            }
            emit(event_tx, SessionEvent::SecretEstablished);
        }
        Ok(Ingested::StateChanged(snapshot)) => {
            tracing::debug!(phase = %snapshot.phase(), "state replaced");
            emit(event_tx, SessionEvent::StateChanged(snapshot));
        }
        Ok(Ingested::Noted) => {}
        Err(e) => {
            tracing::warn!(error = %e, "dropping malformed frame");
        }
    }
}

/// Best-effort event delivery: a full channel drops the event with a
/// warning rather than stalling the loop behind a slow consumer.
fn emit(event_tx: &mpsc::Sender<SessionEvent>, event: SessionEvent) {
    use tokio::sync::mpsc::error::TrySendError;
    match event_tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            tracing::warn!(?event, "event channel full, dropping event");
        }
        Err(TrySendError::Closed(_)) => {}
    }
}
