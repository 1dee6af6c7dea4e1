//! Client configuration
//!
//! [`ClientConfig`] is assembled by the builder and immutable for the life of
//! a client, with one exception: the bearer token, which lives in the client
//! itself so it can be rotated without rebuilding the configuration. The
//! endpoint URL is therefore a pure function of config + current token,
//! recomputed on every connect attempt — a rotated token is picked up
//! automatically by the next attempt.

use std::time::Duration;

use rewire_core::{Error, Outbound, Result};
use url::Url;

use crate::channel::Channel;

/// Default delay before the first reconnect attempt.
pub const DEFAULT_RECONNECT_BASE_DELAY: Duration = Duration::from_millis(1000);
/// Default cap on the reconnect delay.
pub const DEFAULT_RECONNECT_MAX_DELAY: Duration = Duration::from_millis(30_000);
/// Default channel-level keep-alive payload.
pub const DEFAULT_HEARTBEAT_PAYLOAD: &str = "ping";
/// Close codes treated as authentication failures by default: the custom
/// missing-token code and the standard policy-violation code.
pub const DEFAULT_AUTH_CLOSE_CODES: [u16; 2] = [4401, 1008];

/// Configuration for one socket client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the deployment; `http(s)` is rewritten to `ws(s)`.
    pub base_url: String,
    /// The channel this client is bound to.
    pub channel: Channel,
    /// Initial bearer token. May be empty: some deployments require a token
    /// only on privileged operations, so the client still connects and the
    /// condition is logged at debug level rather than treated as an error.
    pub token: String,
    /// Reconnect automatically on ordinary closes.
    pub reconnect: bool,
    /// Delay before the first reconnect attempt.
    pub reconnect_base_delay: Duration,
    /// Cap on the reconnect delay.
    pub reconnect_max_delay: Duration,
    /// Maximum number of reconnect attempts per outage; `None` is unbounded.
    pub max_retries: Option<u32>,
    /// Channel-level keep-alive interval; `None` disables the heartbeat.
    pub heartbeat_interval: Option<Duration>,
    /// Payload sent on each heartbeat tick.
    pub heartbeat_payload: Outbound,
    /// Close codes classified as authentication failures. Server-specific,
    /// so configurable; see [`DEFAULT_AUTH_CLOSE_CODES`].
    pub auth_close_codes: Vec<u16>,
}

impl ClientConfig {
    /// Configuration with the documented defaults for the given endpoint.
    pub fn new(base_url: impl Into<String>, channel: Channel) -> Self {
        Self {
            base_url: base_url.into(),
            channel,
            token: String::new(),
            reconnect: true,
            reconnect_base_delay: DEFAULT_RECONNECT_BASE_DELAY,
            reconnect_max_delay: DEFAULT_RECONNECT_MAX_DELAY,
            max_retries: None,
            heartbeat_interval: None,
            heartbeat_payload: Outbound::Text(DEFAULT_HEARTBEAT_PAYLOAD.to_owned()),
            auth_close_codes: DEFAULT_AUTH_CLOSE_CODES.to_vec(),
        }
    }

    /// Validate the configuration without touching the network.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for an empty or unparseable base URL or an
    /// unsupported scheme. Channel identifiers are validated by [`Channel`]
    /// construction, before a config exists.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("base URL is required".into()));
        }
        self.endpoint(&self.token).map(|_| ())
    }

    /// Build the endpoint URL for a connection attempt
    ///
    /// Deterministic and side-effect-free: normalizes the scheme
    /// (`http→ws`, `https→wss`), appends the channel path and sets the
    /// url-encoded `token` query parameter. Recomputed on every attempt so
    /// token rotation takes effect on the next connect.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the base URL does not parse or carries a scheme
    /// other than `http`, `https`, `ws` or `wss`.
    pub fn endpoint(&self, token: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {:?}: {e}", self.base_url)))?;

        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(Error::Config(format!(
                    "unsupported base URL scheme {other:?}"
                )))
            }
        };
        url.set_scheme(scheme)
            .map_err(|_| Error::Config(format!("cannot use scheme {scheme:?} on this URL")))?;

        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::Config("base URL cannot carry a path".into()))?;
            path.pop_if_empty();
            for segment in self.channel.segments() {
                path.push(segment);
            }
        }

        url.query_pairs_mut().clear().append_pair("token", token);
        Ok(url)
    }

    /// Whether a close code signals authentication failure.
    pub fn is_auth_close(&self, code: u16) -> bool {
        self.auth_close_codes.contains(&code)
    }
}
