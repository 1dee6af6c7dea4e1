//! Core types and utilities for rewire
//!
//! This crate provides the foundational pieces shared by every rewire crate:
//!
//! - **Types**: the values crossing the client/host boundary ([`Payload`],
//!   [`Outbound`], [`CloseEvent`])
//! - **Codec**: inbound parse-or-passthrough and outbound serialization
//! - **Error handling**: the error taxonomy for socket operations
//! - **Observability**: OpenTelemetry integration for traces, metrics and logs
//!
//! # Overview
//!
//! rewire treats message payloads as opaque: a payload that parses as JSON is
//! delivered parsed, anything else is delivered as the raw text it arrived
//! as. The codec in this crate encodes that contract once, so the client
//! crate never has to make a parsing decision of its own.
//!
//! # Example
//!
//! ```rust
//! use rewire_core::{codec, Outbound, Payload};
//!
//! // Inbound: JSON parses, everything else passes through untouched
//! assert!(matches!(codec::decode(r#"{"kind":"bid"}"#), Payload::Json(_)));
//! assert!(matches!(codec::decode("hello"), Payload::Text(_)));
//!
//! // Outbound: strings are sent as-is, values are JSON-stringified
//! let text = codec::encode(&Outbound::from("ping")).unwrap();
//! assert_eq!(text, "ping");
//! ```

pub mod codec;
pub mod error;
pub mod observability;
pub mod types;

// Re-export the most commonly used types for convenience
pub use error::{Error, Result};
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
pub use types::{CloseEvent, Outbound, Payload};
