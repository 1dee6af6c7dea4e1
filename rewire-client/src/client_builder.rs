//! Client builder
//!
//! The builder is the construction surface for [`SocketClient`]: required
//! base URL and channel up front, everything else fluent. `connect()`
//! validates the configuration synchronously — a configuration mistake is a
//! programming error and fails before any network activity — then spawns the
//! connection task and returns the handle immediately; the host learns about
//! the connection through its callbacks, starting with `on_open`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use rewire_client::{Channel, ClientBuilder};
//! use std::time::Duration;
//!
//! # fn example() -> rewire_core::Result<()> {
//! let client = ClientBuilder::new(
//!         "https://api.example.com",
//!         Channel::chat("conv-7", "user-42")?,
//!     )
//!     .token("bearer-token")
//!     .heartbeat(Duration::from_secs(25))
//!     .on_message(|payload, _raw| println!("message: {payload:?}"))
//!     .on_auth_failure(|code, reason| eprintln!("auth failed: {code} {reason}"))
//!     .connect()?;
//! # let _ = client;
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use rewire_core::{CloseEvent, Error, Outbound, Payload, Result};
use tokio::sync::{mpsc, Mutex, RwLock};

use crate::channel::Channel;
use crate::client::{run, Shared, SocketClient};
use crate::config::ClientConfig;
use crate::connection_state::StateCell;
use crate::events::EventHandlers;
use crate::metrics::ClientMetrics;
use crate::transport::{Connector, WsConnector};

/// Builder for configuring and starting a [`SocketClient`]
pub struct ClientBuilder {
    config: ClientConfig,
    connector: Arc<dyn Connector>,
    handlers: EventHandlers,
    metrics: Option<Arc<ClientMetrics>>,
}

impl ClientBuilder {
    /// Start building a client for a channel on the given deployment.
    pub fn new(base_url: impl Into<String>, channel: Channel) -> Self {
        Self {
            config: ClientConfig::new(base_url, channel),
            connector: Arc::new(WsConnector),
            handlers: EventHandlers::default(),
            metrics: None,
        }
    }

    /// Builder for a chat conversation channel.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if either identifier is missing or blank.
    pub fn chat(
        base_url: impl Into<String>,
        conversation_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self::new(base_url, Channel::chat(conversation_id, user_id)?))
    }

    /// Builder for an auction session channel.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the auction id is missing or blank.
    pub fn auction(base_url: impl Into<String>, auction_id: impl Into<String>) -> Result<Self> {
        Ok(Self::new(base_url, Channel::auction(auction_id)?))
    }

    /// Set the bearer token embedded in the connection URL.
    ///
    /// May be omitted: some deployments require a token only on privileged
    /// operations. Connecting without one is logged at debug level.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = token.into();
        self
    }

    /// Enable or disable automatic reconnection (default: enabled).
    pub fn reconnect(mut self, enabled: bool) -> Self {
        self.config.reconnect = enabled;
        self
    }

    /// Set the base and maximum reconnect delays.
    pub fn reconnect_delays(mut self, base: Duration, max: Duration) -> Self {
        self.config.reconnect_base_delay = base;
        self.config.reconnect_max_delay = max;
        self
    }

    /// Cap the number of reconnect attempts per outage (default: unbounded).
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = Some(max_retries);
        self
    }

    /// Enable the channel-level heartbeat. A zero interval disables it
    /// (the default).
    pub fn heartbeat(mut self, interval: Duration) -> Self {
        self.config.heartbeat_interval = if interval.is_zero() {
            None
        } else {
            Some(interval)
        };
        self
    }

    /// Set the heartbeat payload (default: `"ping"`).
    pub fn heartbeat_payload(mut self, payload: impl Into<Outbound>) -> Self {
        self.config.heartbeat_payload = payload.into();
        self
    }

    /// Replace the set of close codes treated as authentication failures
    /// (default: `[4401, 1008]`).
    pub fn auth_close_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.config.auth_close_codes = codes.into_iter().collect();
        self
    }

    /// Inject a transport factory. Tests use this to script connections;
    /// production keeps the default [`WsConnector`].
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    /// Record client metrics on the given instruments.
    pub fn with_metrics(mut self, metrics: Arc<ClientMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Called when the transport opens, on the initial connect and after
    /// every reconnect.
    pub fn on_open(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.handlers.on_open = Box::new(callback);
        self
    }

    /// Called for each inbound message with the decoded payload and the raw
    /// frame text.
    pub fn on_message(mut self, callback: impl FnMut(Payload, &str) + Send + 'static) -> Self {
        self.handlers.on_message = Box::new(callback);
        self
    }

    /// Called on ordinary transport closes (not auth failures).
    pub fn on_close(mut self, callback: impl FnMut(&CloseEvent) + Send + 'static) -> Self {
        self.handlers.on_close = Box::new(callback);
        self
    }

    /// Called on transport errors. Reconnection is driven from close
    /// classification, never from here.
    pub fn on_error(mut self, callback: impl FnMut(&Error) + Send + 'static) -> Self {
        self.handlers.on_error = Box::new(callback);
        self
    }

    /// Called when a close carries a reserved auth-failure code. The client
    /// will not reconnect until the token is rotated.
    pub fn on_auth_failure(mut self, callback: impl FnMut(u16, &str) + Send + 'static) -> Self {
        self.handlers.on_auth_failure = Box::new(callback);
        self
    }

    /// Validate the configuration, spawn the connection task and return the
    /// handle
    ///
    /// Connecting starts immediately in the background; this method never
    /// waits for the transport. Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for an invalid base URL. Channel identifiers were
    /// already validated when the [`Channel`] was built.
    pub fn connect(self) -> Result<SocketClient> {
        self.config.validate()?;
        if self.config.token.is_empty() {
            tracing::debug!(
                channel = %self.config.channel.path(),
                "connecting without a bearer token"
            );
        }

        let (state, state_rx) = StateCell::new();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            token: RwLock::new(self.config.token.clone()),
            forced_close: AtomicBool::new(false),
            sink: Mutex::new(None),
            state,
            metrics: self.metrics,
            config: self.config,
        });

        tokio::spawn(run(
            Arc::clone(&shared),
            self.connector,
            self.handlers,
            command_rx,
        ));

        Ok(SocketClient::new(shared, command_tx, state_rx))
    }
}
