//! Channel descriptors
//!
//! A channel is a logical real-time topic — one chat conversation, one
//! auction session — addressed by a fixed path prefix plus a small set of
//! identifying segments. The same client implementation serves every channel
//! type; only the path shape differs, so the shape lives here as data.
//!
//! Construction validates every identifier up front: a missing or blank
//! segment is a programming mistake in the host and fails immediately,
//! before any network activity.

use rewire_core::{Error, Result};

/// Path prefix shared by every real-time endpoint.
const PATH_PREFIX: &str = "websocket";

/// A channel descriptor: the path segments appended to the base URL
///
/// # Examples
///
/// ```rust
/// use rewire_client::Channel;
///
/// let chat = Channel::chat("conv-7", "user-42").unwrap();
/// assert_eq!(chat.path(), "websocket/chatbox/conv-7/user-42");
///
/// let auction = Channel::auction("A1").unwrap();
/// assert_eq!(auction.path(), "websocket/auction/A1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    segments: Vec<String>,
}

impl Channel {
    /// A chat conversation channel: `websocket/chatbox/{conversation}/{user}`.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if either identifier is missing or blank.
    pub fn chat(conversation_id: impl Into<String>, user_id: impl Into<String>) -> Result<Self> {
        let conversation_id = required("chat channel", "conversation id", conversation_id)?;
        let user_id = required("chat channel", "user id", user_id)?;
        Ok(Self {
            segments: vec![
                PATH_PREFIX.to_owned(),
                "chatbox".to_owned(),
                conversation_id,
                user_id,
            ],
        })
    }

    /// An auction session channel: `websocket/auction/{auction}`.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the auction id is missing or blank.
    pub fn auction(auction_id: impl Into<String>) -> Result<Self> {
        let auction_id = required("auction channel", "auction id", auction_id)?;
        Ok(Self {
            segments: vec![PATH_PREFIX.to_owned(), "auction".to_owned(), auction_id],
        })
    }

    /// A channel with a deployment-specific path shape.
    ///
    /// `prefix` replaces the channel-type segment (`chatbox`, `auction`) and
    /// `identifiers` supplies the identifying segments, all required.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the prefix or any identifier is missing or blank.
    pub fn custom<I, S>(prefix: impl Into<String>, identifiers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefix = required("custom channel", "path prefix", prefix)?;
        let mut segments = vec![PATH_PREFIX.to_owned(), prefix];
        let mut count = 0usize;
        for identifier in identifiers {
            segments.push(required("custom channel", "identifier", identifier)?);
            count += 1;
        }
        if count == 0 {
            return Err(Error::Config(
                "custom channel requires at least one identifier".into(),
            ));
        }
        Ok(Self { segments })
    }

    /// The channel path, `/`-joined.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    pub(crate) fn segments(&self) -> &[String] {
        &self.segments
    }
}

fn required(channel: &str, name: &str, value: impl Into<String>) -> Result<String> {
    let value = value.into();
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{channel} requires a {name}")));
    }
    Ok(value)
}
