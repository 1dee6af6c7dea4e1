//! Values crossing the client/host boundary
//!
//! These types carry no business meaning: rewire treats chat messages and
//! bids alike as opaque blobs. [`Payload`] is what the host receives,
//! [`Outbound`] is what the host sends, and [`CloseEvent`] describes why a
//! transport went away.

use serde_json::Value;

/// An inbound message as delivered to the host
///
/// Text frames that parse as JSON are delivered parsed; anything else is
/// passed through as the raw text it arrived as. A message is never dropped
/// or rejected solely because it fails to parse.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The frame parsed as JSON
    Json(Value),
    /// The frame did not parse as JSON; the original text, unchanged
    Text(String),
}

impl Payload {
    /// The parsed JSON value, if this payload parsed as JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    /// The raw text, if this payload did not parse as JSON.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Json(_) => None,
            Payload::Text(text) => Some(text),
        }
    }
}

/// An outbound message supplied by the host
///
/// Strings are sent on the wire as-is; JSON values are stringified with
/// standard JSON encoding before sending.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Send this text verbatim
    Text(String),
    /// JSON-encode this value, then send
    Json(Value),
}

impl From<&str> for Outbound {
    fn from(text: &str) -> Self {
        Outbound::Text(text.to_owned())
    }
}

impl From<String> for Outbound {
    fn from(text: String) -> Self {
        Outbound::Text(text)
    }
}

impl From<Value> for Outbound {
    fn from(value: Value) -> Self {
        Outbound::Json(value)
    }
}

/// A transport-level close event
///
/// `code` carries the WebSocket close code; a small set of reserved codes
/// signals authentication failure and is classified by the client, all other
/// codes are ordinary, retry-eligible closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseEvent {
    /// WebSocket close code
    pub code: u16,
    /// Server-supplied close reason, possibly empty
    pub reason: String,
}

impl CloseEvent {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// The 1006 "abnormal closure" event synthesized when a transport ends
    /// without delivering a close frame.
    pub fn abnormal() -> Self {
        Self::new(1006, "")
    }
}

impl std::fmt::Display for CloseEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.reason.is_empty() {
            write!(f, "close code {}", self.code)
        } else {
            write!(f, "close code {} ({})", self.code, self.reason)
        }
    }
}
