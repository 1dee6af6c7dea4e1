//! Codec for inbound and outbound payloads
//!
//! rewire's wire contract is deliberately thin. Inbound text frames are
//! *attempted* as JSON: success delivers the parsed value, failure delivers
//! the original text untouched — the client never drops a message because it
//! failed to parse. Outbound messages are strings sent verbatim or JSON
//! values stringified with standard encoding.
//!
//! Keeping both directions here means the client crate holds no parsing
//! policy of its own, and the pass-through behavior is testable in isolation.

use crate::error::{Error, Result};
use crate::types::{Outbound, Payload};

/// Decode an inbound text frame into a [`Payload`]
///
/// Never fails: a frame that does not parse as JSON is returned as
/// [`Payload::Text`] carrying the exact original string.
///
/// # Examples
///
/// ```rust
/// use rewire_core::{codec, Payload};
///
/// assert!(matches!(codec::decode("[1,2,3]"), Payload::Json(_)));
/// assert_eq!(codec::decode("plain"), Payload::Text("plain".into()));
/// ```
pub fn decode(text: &str) -> Payload {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => Payload::Json(value),
        Err(_) => Payload::Text(text.to_owned()),
    }
}

/// Encode an [`Outbound`] message to the text that goes on the wire
///
/// Strings are returned as-is; JSON values are stringified.
///
/// # Errors
///
/// Returns [`Error::Serialization`] if the value cannot be stringified.
pub fn encode(message: &Outbound) -> Result<String> {
    match message {
        Outbound::Text(text) => Ok(text.clone()),
        Outbound::Json(value) => {
            serde_json::to_string(value).map_err(|e| Error::Serialization(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_json_object() {
        let payload = decode(r#"{"type":"bid","amount":250}"#);
        assert_eq!(
            payload,
            Payload::Json(json!({"type": "bid", "amount": 250}))
        );
    }

    #[test]
    fn test_decode_json_scalar() {
        // Bare JSON scalars are still JSON
        assert_eq!(decode("42"), Payload::Json(json!(42)));
        assert_eq!(decode("true"), Payload::Json(json!(true)));
    }

    #[test]
    fn test_decode_non_json_passes_through() {
        let original = "hello there";
        match decode(original) {
            Payload::Text(text) => assert_eq!(text, original),
            Payload::Json(_) => panic!("plain text must not decode as JSON"),
        }
    }

    #[test]
    fn test_decode_malformed_json_passes_through() {
        let original = r#"{"unterminated": "#;
        assert_eq!(decode(original), Payload::Text(original.into()));
    }

    #[test]
    fn test_encode_text_verbatim() {
        let text = encode(&Outbound::Text("ping".into())).unwrap();
        assert_eq!(text, "ping");
    }

    #[test]
    fn test_encode_json_value() {
        let text = encode(&Outbound::Json(json!({"type": "typing"}))).unwrap();
        assert_eq!(text, r#"{"type":"typing"}"#);
    }

    #[test]
    fn test_object_round_trip() {
        let value = json!({"nested": {"list": [1, 2, 3]}, "s": "x"});
        let wire = encode(&Outbound::Json(value.clone())).unwrap();
        assert_eq!(decode(&wire), Payload::Json(value));
    }
}
