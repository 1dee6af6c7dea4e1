//! Transport abstraction
//!
//! The client never opens sockets directly: it asks a [`Connector`] for the
//! sink/stream halves of a fresh transport on every attempt. Production use
//! goes through [`WsConnector`] (tokio-tungstenite); tests inject a scripted
//! connector and drive the client with synthetic frames and closes.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Sink, SinkExt, Stream, StreamExt};
use rewire_core::{Error, Result};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// Write half of an established transport.
pub type TransportSink = Pin<Box<dyn Sink<Message, Error = Error> + Send>>;
/// Read half of an established transport.
pub type TransportStream = Pin<Box<dyn Stream<Item = Result<Message>> + Send>>;

/// Factory for transport connections
///
/// A connector is handed the fully built endpoint URL (scheme normalized,
/// channel path appended, current token in the query) and returns the two
/// halves of an open transport, or the error that prevented one.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, url: &Url) -> Result<(TransportSink, TransportStream)>;
}

/// Production connector over tokio-tungstenite
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &Url) -> Result<(TransportSink, TransportStream)> {
        let (stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| Error::WebSocket(e.to_string()))?;
        let (sink, stream) = stream.split();

        let sink: TransportSink =
            Box::pin(sink.sink_map_err(|e| Error::WebSocket(e.to_string())));
        let stream: TransportStream =
            Box::pin(stream.map(|item| item.map_err(|e| Error::WebSocket(e.to_string()))));
        Ok((sink, stream))
    }
}
