//! The resilient socket client
//!
//! One [`SocketClient`] owns one logical real-time connection. A background
//! task holds the transport and serializes every lifecycle transition:
//! connect attempts, inbound frames, heartbeat ticks, backoff waits and host
//! commands all pass through a single `select!` loop, so no two handlers ever
//! run concurrently for the same instance and at most one live transport
//! exists at a time.
//!
//! The handle side is non-blocking. `send` writes through a sink slot that is
//! only populated while a transport is open; `close`, `connect` and
//! `update_token` post commands the task picks up at its next suspension
//! point. Reconnection churn is invisible to call sites: the host sees
//! `on_close` followed (eventually) by another `on_open`, with the same
//! handle staying valid throughout.
//!
//! # Cloning
//!
//! `SocketClient` is cheaply cloneable; all clones drive the same connection.
//! The connection task exits when `close()` is followed by every handle being
//! dropped, or as soon as all handles are dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::SinkExt;
use rewire_core::{codec, CloseEvent, Error, Outbound};
use tokio::sync::{mpsc, watch, Mutex, RwLock};
use tokio_tungstenite::tungstenite::Message;

use crate::config::ClientConfig;
use crate::connection_state::{ConnectionState, StateCell};
use crate::events::EventHandlers;
use crate::metrics::ClientMetrics;
use crate::reconnect::Backoff;
use crate::transport::{Connector, TransportSink, TransportStream};

/// Host commands handled by the connection task.
pub(crate) enum Command {
    /// Tear down the current transport (if any) and reconnect through the
    /// normal path. Sent by `connect()` and immediate token rotation.
    Cycle,
    /// Forced shutdown: no reconnection.
    Close,
}

/// State shared between the handle and the connection task.
pub(crate) struct Shared {
    pub config: ClientConfig,
    /// Current bearer token; rotated via `update_token`.
    pub token: RwLock<String>,
    /// Set by `close()`. A close event observed while this is set never
    /// schedules a reconnect.
    pub forced_close: AtomicBool,
    /// Write half of the live transport; `None` whenever no transport is open.
    pub sink: Mutex<Option<TransportSink>>,
    pub state: StateCell,
    pub metrics: Option<Arc<ClientMetrics>>,
}

impl Shared {
    fn set_state(&self, state: ConnectionState) {
        self.state.set(state);
        if let Some(metrics) = &self.metrics {
            metrics.record_state(state);
        }
    }
}

/// Handle to one resilient real-time connection
///
/// Built by [`crate::ClientBuilder`]; the builder's `connect()` spawns the
/// connection task and returns this handle immediately.
#[derive(Clone)]
pub struct SocketClient {
    shared: Arc<Shared>,
    commands: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<ConnectionState>,
}

impl std::fmt::Debug for SocketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketClient")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl SocketClient {
    pub(crate) fn new(
        shared: Arc<Shared>,
        commands: mpsc::UnboundedSender<Command>,
        state_rx: watch::Receiver<ConnectionState>,
    ) -> Self {
        Self {
            shared,
            commands,
            state_rx,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Receiver notified on every connection state change.
    ///
    /// Useful for hosts rendering a connecting/connected/failed indicator
    /// without subscribing to the lifecycle callbacks.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// True while the transport is open and sends can succeed.
    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// Send a message on the channel
    ///
    /// Strings go on the wire as-is, JSON values are stringified. Returns
    /// `false` — never an error, never queuing — when the transport is not
    /// currently open or the transport-level send fails: this client does
    /// not buffer outbound messages across disconnects.
    pub async fn send(&self, message: impl Into<Outbound>) -> bool {
        let message = message.into();
        let text = match codec::encode(&message) {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(%error, "dropping outbound message that failed to serialize");
                return false;
            }
        };

        if !self.is_open() {
            tracing::debug!("send while not open, dropping message");
            return false;
        }

        let mut slot = self.shared.sink.lock().await;
        let Some(sink) = slot.as_mut() else {
            // The transport went away between the state check and the lock.
            tracing::debug!("send raced transport teardown, dropping message");
            return false;
        };
        match sink.send(Message::Text(text)).await {
            Ok(()) => {
                if let Some(metrics) = &self.shared.metrics {
                    metrics.record_message_sent();
                }
                true
            }
            Err(error) => {
                tracing::debug!(%error, "transport send failed");
                if let Some(metrics) = &self.shared.metrics {
                    metrics.record_error("send");
                }
                false
            }
        }
    }

    /// Forced shutdown
    ///
    /// Suppresses any reconnect the resulting close would otherwise trigger,
    /// stops the heartbeat, cancels a pending reconnect wait and closes the
    /// transport if one is open. Idempotent; safe to call when never
    /// connected. The handle stays usable: `connect()` re-establishes.
    pub fn close(&self) {
        self.shared.forced_close.store(true, Ordering::SeqCst);
        // The task may already have exited (every handle dropped elsewhere);
        // nothing to close in that case.
        let _ = self.commands.send(Command::Close);
    }

    /// Re-establish the connection
    ///
    /// Clears the forced-close flag. If a transport is currently open it is
    /// cycled so only one live transport ever exists.
    pub fn connect(&self) {
        self.shared.forced_close.store(false, Ordering::SeqCst);
        let _ = self.commands.send(Command::Cycle);
    }

    /// Rotate the bearer token and reconnect with it
    ///
    /// Clears the forced-close flag — rotation must not be mistaken for a
    /// shutdown — then either cycles the open transport through the normal
    /// close→reconnect path or, when no transport is open, drops any pending
    /// reconnect wait and connects immediately. The next attempt's URL
    /// carries the new token.
    pub async fn update_token(&self, token: impl Into<String>) {
        *self.shared.token.write().await = token.into();
        self.shared.forced_close.store(false, Ordering::SeqCst);
        let _ = self.commands.send(Command::Cycle);
    }

    /// Rotate the bearer token without touching the connection
    ///
    /// The new token is used by whichever connection attempt happens next.
    pub async fn update_token_deferred(&self, token: impl Into<String>) {
        *self.shared.token.write().await = token.into();
    }
}

/// Why the connected phase ended.
enum Outcome {
    /// Peer delivered a close frame, or the stream ended.
    Close(CloseEvent),
    /// Transport error; an abnormal close follows.
    Errored(Error),
    /// `close()` was called.
    Forced,
    /// `connect()` or token rotation asked for a fresh transport.
    Cycle,
    /// Every handle was dropped.
    HandleDropped,
}

/// Result of waiting in a terminal state.
enum Park {
    Reconnect,
    Exit,
}

/// The connection task
///
/// Owns the transport for the life of the client. Terminal states
/// (`Closed`, `AuthFailed`, retry budget exhausted) park the task on the
/// command channel so a later `connect()` or token rotation can revive it.
pub(crate) async fn run(
    shared: Arc<Shared>,
    connector: Arc<dyn Connector>,
    mut handlers: EventHandlers,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let mut backoff = Backoff::new(
        shared.config.reconnect_base_delay,
        shared.config.reconnect_max_delay,
    )
    .with_max_retries(shared.config.max_retries);

    'lifecycle: loop {
        if shared.forced_close.load(Ordering::SeqCst) {
            shared.set_state(ConnectionState::Closed);
            match park(&mut commands).await {
                Park::Reconnect => continue 'lifecycle,
                Park::Exit => return,
            }
        }

        shared.set_state(ConnectionState::Connecting);
        let token = shared.token.read().await.clone();
        let url = match shared.config.endpoint(&token) {
            Ok(url) => url,
            Err(error) => {
                // The config was validated at construction, so this only
                // fires if the deployment URL itself is broken.
                tracing::error!(%error, "endpoint construction failed");
                handlers.error(&error);
                shared.set_state(ConnectionState::Closed);
                match park(&mut commands).await {
                    Park::Reconnect => continue 'lifecycle,
                    Park::Exit => return,
                }
            }
        };

        let reconnecting = backoff.attempt() > 0;
        tracing::debug!(
            channel = %shared.config.channel.path(),
            attempt = backoff.attempt(),
            "connecting"
        );

        match connector.connect(&url).await {
            Ok((sink, stream)) => {
                backoff.reset();
                *shared.sink.lock().await = Some(sink);
                shared.set_state(ConnectionState::Open);
                if reconnecting {
                    if let Some(metrics) = &shared.metrics {
                        metrics.record_reconnect_success();
                    }
                }
                tracing::debug!("connection open");
                handlers.open();

                let outcome = drive(&shared, stream, &mut handlers, &mut commands).await;

                // The heartbeat interval died with drive()'s scope; tear down
                // the write half before classifying the close.
                if let Some(mut sink) = shared.sink.lock().await.take() {
                    let _ = sink.close().await;
                }

                match outcome {
                    Outcome::HandleDropped => {
                        shared.set_state(ConnectionState::Closed);
                        return;
                    }
                    Outcome::Forced => {
                        shared.set_state(ConnectionState::Closing);
                        handlers.close(&CloseEvent::new(1000, "closed by client"));
                        shared.set_state(ConnectionState::Closed);
                        match park(&mut commands).await {
                            Park::Reconnect => continue 'lifecycle,
                            Park::Exit => return,
                        }
                    }
                    Outcome::Cycle => {
                        shared.set_state(ConnectionState::Connecting);
                        handlers.close(&CloseEvent::new(1000, "connection recycled"));
                    }
                    Outcome::Errored(error) => {
                        shared.set_state(ConnectionState::Connecting);
                        if let Some(metrics) = &shared.metrics {
                            metrics.record_error("websocket");
                        }
                        handlers.error(&error);
                        handlers.close(&CloseEvent::abnormal());
                    }
                    Outcome::Close(event) => {
                        if shared.config.is_auth_close(event.code) {
                            tracing::warn!(
                                code = event.code,
                                reason = %event.reason,
                                "credentials rejected by server"
                            );
                            shared.set_state(ConnectionState::AuthFailed);
                            if let Some(metrics) = &shared.metrics {
                                metrics.record_auth_failure(event.code);
                            }
                            handlers.auth_failure(event.code, &event.reason);
                            // Retrying with a rejected token cannot succeed;
                            // wait for the host to rotate it.
                            match park(&mut commands).await {
                                Park::Reconnect => continue 'lifecycle,
                                Park::Exit => return,
                            }
                        }
                        shared.set_state(ConnectionState::Connecting);
                        handlers.close(&event);
                    }
                }
            }
            Err(error) => {
                tracing::debug!(%error, "connection attempt failed");
                if let Some(metrics) = &shared.metrics {
                    metrics.record_error("connect");
                }
                handlers.error(&error);
            }
        }

        // Retry scheduling: reached on ordinary closes, recycles and failed
        // connection attempts.
        if shared.forced_close.load(Ordering::SeqCst) || !shared.config.reconnect {
            shared.set_state(ConnectionState::Closed);
            match park(&mut commands).await {
                Park::Reconnect => continue 'lifecycle,
                Park::Exit => return,
            }
        }
        let Some(delay) = backoff.next_delay() else {
            tracing::info!("retry budget exhausted, not reconnecting");
            shared.set_state(ConnectionState::Closed);
            match park(&mut commands).await {
                Park::Reconnect => continue 'lifecycle,
                Park::Exit => return,
            }
        };
        if let Some(metrics) = &shared.metrics {
            metrics.record_reconnect_attempt(backoff.attempt());
        }
        tracing::debug!(
            attempt = backoff.attempt(),
            delay_ms = delay.as_millis() as u64,
            "reconnect scheduled"
        );
        shared.set_state(ConnectionState::Connecting);
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            command = commands.recv() => match command {
                // Token rotation while waiting: drop the pending delay and
                // connect right away with the fresh token.
                Some(Command::Cycle) => {}
                Some(Command::Close) => {
                    shared.set_state(ConnectionState::Closed);
                    match park(&mut commands).await {
                        Park::Reconnect => continue 'lifecycle,
                        Park::Exit => return,
                    }
                }
                None => {
                    shared.set_state(ConnectionState::Closed);
                    return;
                }
            }
        }
    }
}

/// Pump one open transport until something ends the connected phase.
async fn drive(
    shared: &Shared,
    mut stream: TransportStream,
    handlers: &mut EventHandlers,
    commands: &mut mpsc::UnboundedReceiver<Command>,
) -> Outcome {
    use futures::StreamExt;

    // At most one heartbeat timer is ever live: it is created here and dies
    // with this scope, before any reconnect attempt.
    let mut heartbeat = shared
        .config
        .heartbeat_interval
        .map(|period| tokio::time::interval_at(tokio::time::Instant::now() + period, period));

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if let Some(metrics) = &shared.metrics {
                        metrics.record_message_received();
                    }
                    let payload = codec::decode(&text);
                    handlers.message(payload, &text);
                }
                Some(Ok(Message::Close(frame))) => {
                    let event = frame
                        .map(|f| CloseEvent::new(u16::from(f.code), f.reason.into_owned()))
                        .unwrap_or_else(|| CloseEvent::new(1005, ""));
                    tracing::debug!(%event, "transport closed");
                    return Outcome::Close(event);
                }
                Some(Ok(_)) => {
                    // Binary frames and transport-level ping/pong carry no
                    // channel payloads.
                }
                Some(Err(error)) => {
                    tracing::debug!(%error, "transport error");
                    return Outcome::Errored(error);
                }
                None => return Outcome::Close(CloseEvent::abnormal()),
            },
            command = commands.recv() => match command {
                Some(Command::Close) => return Outcome::Forced,
                Some(Command::Cycle) => return Outcome::Cycle,
                None => return Outcome::HandleDropped,
            },
            _ = tick(heartbeat.as_mut()) => {
                send_heartbeat(shared).await;
            }
        }
    }
}

async fn tick(interval: Option<&mut tokio::time::Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Serialize and send the configured heartbeat payload.
async fn send_heartbeat(shared: &Shared) {
    let text = match codec::encode(&shared.config.heartbeat_payload) {
        Ok(text) => text,
        Err(error) => {
            tracing::warn!(%error, "heartbeat payload failed to serialize");
            return;
        }
    };
    let mut slot = shared.sink.lock().await;
    if let Some(sink) = slot.as_mut() {
        match sink.send(Message::Text(text)).await {
            Ok(()) => {
                tracing::trace!("heartbeat sent");
                if let Some(metrics) = &shared.metrics {
                    metrics.record_heartbeat();
                }
            }
            Err(error) => tracing::debug!(%error, "heartbeat send failed"),
        }
    }
}

/// Wait in a terminal state for the host to revive or drop the client.
async fn park(commands: &mut mpsc::UnboundedReceiver<Command>) -> Park {
    loop {
        match commands.recv().await {
            Some(Command::Cycle) => return Park::Reconnect,
            // Already stopped; close() is idempotent.
            Some(Command::Close) => continue,
            None => return Park::Exit,
        }
    }
}
