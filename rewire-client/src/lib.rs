//! Resilient WebSocket client with reconnection, heartbeat and token rotation
//!
//! This crate provides [`SocketClient`], which owns one logical real-time
//! connection per instance and hides reconnection churn from the host behind
//! a small set of event callbacks, while giving the host explicit control
//! over shutdown and credential rotation.
//!
//! # Core Features
//!
//! - **Channel parameterization**: one client serves chat conversations,
//!   auction sessions and custom channel shapes via [`Channel`]
//! - **Auto-Reconnection**: exponential backoff with jitter, configurable cap
//!   and retry budget; the retry counter resets on every successful open
//! - **Auth-failure classification**: reserved close codes stop reconnection
//!   and surface through a dedicated callback instead of the retry loop
//! - **Token rotation**: swap the bearer token at runtime; the next
//!   connection attempt rebuilds the URL with it
//! - **Heartbeat**: optional channel-level keep-alive payload
//! - **Injected transport**: a [`Connector`] factory seam so tests drive the
//!   client with scripted transports and a virtual clock
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rewire_client::{Channel, ClientBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClientBuilder::new(
//!             "https://api.example.com",
//!             Channel::auction("A1")?,
//!         )
//!         .token("bearer-token")
//!         .on_open(|| println!("live"))
//!         .on_message(|payload, _raw| println!("bid update: {payload:?}"))
//!         .on_auth_failure(|code, reason| eprintln!("rejected: {code} {reason}"))
//!         .connect()?;
//!
//!     // The handle is non-blocking; sends simply return false while the
//!     // client is between transports.
//!     let delivered = client.send(serde_json::json!({"type": "watch"})).await;
//!     println!("delivered: {delivered}");
//!
//!     client.close();
//!     Ok(())
//! }
//! ```

mod channel;
mod client;
mod client_builder;
mod config;
mod connection_state;
mod events;
mod metrics;
mod reconnect;
mod transport;

pub use channel::Channel;
pub use client::SocketClient;
pub use client_builder::ClientBuilder;
pub use config::{
    ClientConfig, DEFAULT_AUTH_CLOSE_CODES, DEFAULT_HEARTBEAT_PAYLOAD,
    DEFAULT_RECONNECT_BASE_DELAY, DEFAULT_RECONNECT_MAX_DELAY,
};
pub use connection_state::ConnectionState;
pub use events::{AuthFailureFn, CloseFn, ErrorFn, MessageFn, OpenFn};
pub use metrics::ClientMetrics;
pub use reconnect::{Backoff, BACKOFF_FACTOR, JITTER_RATIO, MIN_DELAY};
pub use transport::{Connector, TransportSink, TransportStream, WsConnector};
