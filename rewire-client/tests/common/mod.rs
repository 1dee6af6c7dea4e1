//! Common test utilities for rewire-client integration tests
//!
//! Provides a scripted [`MockConnector`] so tests can drive the client with
//! synthetic frames, closes and refused connections, plus an [`EventLog`]
//! recording every host callback. Connection attempts are timestamped with
//! the tokio clock; combined with `start_paused` tests this makes backoff
//! windows deterministic to assert.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rewire_client::{ClientBuilder, Connector, TransportSink, TransportStream};
use rewire_core::{Error, Payload, Result};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// One connection attempt observed by the mock connector.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub url: String,
    pub at: Instant,
}

enum Plan {
    Accept,
    Refuse,
}

/// Server side of one scripted transport
///
/// The test injects frames with `send_*` and observes what the client wrote
/// with `recv_text`.
pub struct MockSocket {
    inbound: Mutex<Option<mpsc::UnboundedSender<Result<Message>>>>,
    outbound: tokio::sync::Mutex<mpsc::UnboundedReceiver<Message>>,
}

impl MockSocket {
    /// Deliver a text frame to the client.
    pub fn send_text(&self, text: &str) {
        if let Some(tx) = &*self.inbound.lock().unwrap() {
            let _ = tx.send(Ok(Message::Text(text.to_owned())));
        }
    }

    /// Deliver a close frame with the given code and reason.
    pub fn send_close(&self, code: u16, reason: &str) {
        if let Some(tx) = &*self.inbound.lock().unwrap() {
            let _ = tx.send(Ok(Message::Close(Some(CloseFrame {
                code: code.into(),
                reason: reason.to_owned().into(),
            }))));
        }
    }

    /// Deliver a transport error to the client.
    pub fn send_error(&self, message: &str) {
        if let Some(tx) = &*self.inbound.lock().unwrap() {
            let _ = tx.send(Err(Error::WebSocket(message.to_owned())));
        }
    }

    /// End the stream without a close frame, like a dropped TCP connection.
    pub fn drop_connection(&self) {
        self.inbound.lock().unwrap().take();
    }

    /// Next text frame the client wrote, or `None` if the test's wait budget
    /// elapses first.
    pub async fn recv_text(&self) -> Option<String> {
        let mut outbound = self.outbound.lock().await;
        loop {
            let message =
                tokio::time::timeout(Duration::from_secs(60), outbound.recv()).await.ok()??;
            if let Message::Text(text) = message {
                return Some(text);
            }
        }
    }
}

#[derive(Default)]
struct Inner {
    attempts: Vec<Attempt>,
    plans: VecDeque<Plan>,
    sockets: Vec<Arc<MockSocket>>,
}

/// Scripted transport factory
///
/// Each `connect` call consumes the next planned outcome (default: accept)
/// and records the attempt with the URL the client built.
#[derive(Clone, Default)]
pub struct MockConnector {
    inner: Arc<Mutex<Inner>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse the next `count` connection attempts.
    pub fn refuse_next(&self, count: usize) {
        let mut inner = self.inner.lock().unwrap();
        for _ in 0..count {
            inner.plans.push_back(Plan::Refuse);
        }
    }

    pub fn attempts(&self) -> Vec<Attempt> {
        self.inner.lock().unwrap().attempts.clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.inner.lock().unwrap().attempts.len()
    }

    /// The accepted transport with the given index (0 = initial connection).
    pub fn socket(&self, index: usize) -> Arc<MockSocket> {
        Arc::clone(&self.inner.lock().unwrap().sockets[index])
    }

    pub fn latest_socket(&self) -> Arc<MockSocket> {
        let inner = self.inner.lock().unwrap();
        Arc::clone(inner.sockets.last().expect("no accepted connection yet"))
    }

    /// Wait until at least `count` attempts were made.
    pub async fn wait_for_attempts(&self, count: usize) {
        let connector = self.clone();
        wait_until(move || connector.attempt_count() >= count).await;
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, url: &Url) -> Result<(TransportSink, TransportStream)> {
        let plan = {
            let mut inner = self.inner.lock().unwrap();
            inner.attempts.push(Attempt {
                url: url.to_string(),
                at: Instant::now(),
            });
            inner.plans.pop_front().unwrap_or(Plan::Accept)
        };

        match plan {
            Plan::Refuse => Err(Error::WebSocket("connection refused".into())),
            Plan::Accept => {
                let (in_tx, in_rx) = mpsc::unbounded_channel::<Result<Message>>();
                let (out_tx, out_rx) = mpsc::unbounded_channel::<Message>();

                let socket = Arc::new(MockSocket {
                    inbound: Mutex::new(Some(in_tx)),
                    outbound: tokio::sync::Mutex::new(out_rx),
                });
                self.inner.lock().unwrap().sockets.push(socket);

                let sink: TransportSink =
                    Box::pin(futures::sink::unfold(out_tx, |tx, message: Message| async move {
                        tx.send(message).map_err(|_| Error::ConnectionClosed)?;
                        Ok::<_, Error>(tx)
                    }));
                let stream: TransportStream =
                    Box::pin(futures::stream::unfold(in_rx, |mut rx| async move {
                        rx.recv().await.map(|item| (item, rx))
                    }));
                Ok((sink, stream))
            }
        }
    }
}

/// Everything the host observed, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum EventRecord {
    Open,
    Message(Payload, String),
    Close(u16),
    Error(String),
    AuthFailure(u16, String),
}

/// Records every host callback for later assertions.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<EventRecord>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: EventRecord) {
        self.events.lock().unwrap().push(event);
    }

    /// Register all five callbacks on the builder, recording into this log.
    pub fn attach(&self, builder: ClientBuilder) -> ClientBuilder {
        let log = self.clone();
        let builder = builder.on_open(move || log.push(EventRecord::Open));
        let log = self.clone();
        let builder = builder.on_message(move |payload, raw| {
            log.push(EventRecord::Message(payload, raw.to_owned()));
        });
        let log = self.clone();
        let builder = builder.on_close(move |event| log.push(EventRecord::Close(event.code)));
        let log = self.clone();
        let builder = builder.on_error(move |error| log.push(EventRecord::Error(error.to_string())));
        let log = self.clone();
        builder.on_auth_failure(move |code, reason| {
            log.push(EventRecord::AuthFailure(code, reason.to_owned()));
        })
    }

    pub fn events(&self) -> Vec<EventRecord> {
        self.events.lock().unwrap().clone()
    }

    pub fn opens(&self) -> usize {
        self.count(|e| matches!(e, EventRecord::Open))
    }

    pub fn closes(&self) -> Vec<u16> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                EventRecord::Close(code) => Some(code),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> usize {
        self.count(|e| matches!(e, EventRecord::Error(_)))
    }

    pub fn auth_failures(&self) -> Vec<(u16, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                EventRecord::AuthFailure(code, reason) => Some((code, reason)),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<(Payload, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                EventRecord::Message(payload, raw) => Some((payload, raw)),
                _ => None,
            })
            .collect()
    }

    fn count(&self, predicate: impl Fn(&EventRecord) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }
}

/// Polling step for [`wait_until`]; small enough not to distort the backoff
/// windows under test.
pub const STEP: Duration = Duration::from_millis(10);

/// Poll until `predicate` holds, letting the paused clock advance in steps.
///
/// Panics if the predicate stays false for the whole (virtual) budget.
pub async fn wait_until(mut predicate: impl FnMut() -> bool) {
    for _ in 0..6_000 {
        if predicate() {
            return;
        }
        tokio::time::sleep(STEP).await;
    }
    panic!("condition not reached within the polling budget");
}
