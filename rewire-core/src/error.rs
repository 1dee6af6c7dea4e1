//! Error types for rewire
//!
//! The error taxonomy mirrors how conditions are surfaced to the host:
//!
//! - **Configuration errors** are programming mistakes (a missing channel
//!   identifier, a base URL that does not parse). They are the only errors
//!   that propagate as `Err` values, synchronously, before any network
//!   activity.
//! - **Runtime conditions** (WebSocket failures, serialization issues, a
//!   closed connection) never propagate as `Err` from client methods; they
//!   reach the host through its registered callbacks while the client's own
//!   retry loop recovers from them.

use thiserror::Error;

/// Result type for rewire operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type covering every condition a rewire client can report
///
/// Only [`Error::Config`] is ever returned from public constructors; the
/// remaining variants are delivered to the host's `on_error` callback and
/// describe transient runtime conditions the client recovers from on its own.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Invalid client configuration
    ///
    /// Raised synchronously at construction time, before any connection
    /// attempt: a missing or blank channel identifier, an empty or
    /// unparseable base URL, an unsupported URL scheme. Never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// WebSocket transport layer error
    ///
    /// Connection establishment failures, protocol violations or frame
    /// processing errors. Recovered via the reconnect policy.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Serialization error on an outbound payload
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The connection is no longer active
    ///
    /// Further sends will fail until the client has reconnected.
    #[error("connection closed")]
    ConnectionClosed,
}

impl Error {
    /// True for configuration errors, the only fatal class.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}
