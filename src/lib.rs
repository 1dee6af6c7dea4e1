//! REWIRE - Resilient real-time socket client
//!
//! This is the main convenience crate that re-exports all rewire sub-crates.
//! Use this crate if you want a single dependency that provides the socket
//! client together with its foundational types.
//!
//! # Architecture
//!
//! rewire is organized into modular crates:
//!
//! - **rewire-core**: Payload/close-event types, codec, error handling, observability
//! - **rewire-client**: The resilient socket client with reconnection and heartbeat
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rewire::{Channel, ClientBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let channel = Channel::auction("A1")?;
//!     let client = ClientBuilder::new("https://api.example.com", channel)
//!         .token("bearer-token")
//!         .on_message(|payload, _raw| {
//!             println!("bid update: {:?}", payload);
//!         })
//!         .connect()?;
//!
//!     // ... host application runs; the client reconnects on its own ...
//!
//!     client.close();
//!     Ok(())
//! }
//! ```

// Re-export all public APIs from sub-crates
// This allows users to access everything through the `rewire::` prefix
pub use rewire_client as client;
pub use rewire_core as core;

// Convenience re-exports of the most commonly used types
pub use rewire_client::{Channel, ClientBuilder, ConnectionState, SocketClient};
pub use rewire_core::{CloseEvent, Error, Outbound, Payload, Result};
