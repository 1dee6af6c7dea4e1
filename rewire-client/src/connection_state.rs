//! Connection state management
//!
//! The connection task is the only writer of the state; hosts observe it
//! read-only through [`crate::SocketClient::state`] and
//! [`crate::SocketClient::state_changes`]. A `watch` channel carries the
//! state so hosts can await transitions instead of polling.
//!
//! # State Transitions
//!
//! ```text
//! Idle → Connecting → Open → Closing → Closed
//!            ↑          │
//!            └──────────┤ (ordinary close, retry-eligible)
//!                       └→ AuthFailed   (reserved close code, terminal)
//! ```
//!
//! `Closed` and `AuthFailed` are terminal until the host explicitly calls
//! `connect()` or rotates the token.

use tokio::sync::watch;

/// Connection state of one client instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created, no connection attempt yet
    Idle,
    /// Attempting to connect (includes reconnect attempts and backoff waits)
    Connecting,
    /// Transport is open and usable
    Open,
    /// Host-initiated shutdown in progress
    Closing,
    /// Not connected and not attempting to connect
    Closed,
    /// The server rejected the connection's credentials; terminal until the
    /// host rotates the token or reconnects explicitly
    AuthFailed,
}

impl ConnectionState {
    /// True while the transport is open and sends can succeed.
    pub const fn is_open(self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// True once the client has stopped on its own and will not reconnect
    /// without host intervention.
    pub const fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::AuthFailed)
    }
}

/// The single writer side of the connection state
pub(crate) struct StateCell {
    tx: watch::Sender<ConnectionState>,
}

impl StateCell {
    /// New cell starting at [`ConnectionState::Idle`], plus a receiver for
    /// the client handle.
    pub fn new() -> (Self, watch::Receiver<ConnectionState>) {
        let (tx, rx) = watch::channel(ConnectionState::Idle);
        (Self { tx }, rx)
    }

    pub fn get(&self) -> ConnectionState {
        *self.tx.borrow()
    }

    pub fn set(&self, next: ConnectionState) {
        let previous = self.tx.send_replace(next);
        if previous != next {
            tracing::debug!(?previous, state = ?next, "connection state changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(ConnectionState::Open.is_open());
        assert!(!ConnectionState::Connecting.is_open());
        assert!(ConnectionState::Closed.is_terminal());
        assert!(ConnectionState::AuthFailed.is_terminal());
        assert!(!ConnectionState::Open.is_terminal());
        assert!(!ConnectionState::Idle.is_terminal());
    }

    #[test]
    fn test_cell_starts_idle() {
        let (cell, rx) = StateCell::new();
        assert_eq!(cell.get(), ConnectionState::Idle);
        assert_eq!(*rx.borrow(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn test_receiver_observes_transitions() {
        let (cell, mut rx) = StateCell::new();

        cell.set(ConnectionState::Connecting);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), ConnectionState::Connecting);

        cell.set(ConnectionState::Open);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), ConnectionState::Open);
    }

    #[test]
    fn test_set_survives_dropped_receivers() {
        let (cell, rx) = StateCell::new();
        drop(rx);
        cell.set(ConnectionState::Open);
        assert_eq!(cell.get(), ConnectionState::Open);
    }
}
