//! Client metrics definitions
//!
//! OpenTelemetry instruments for monitoring connection health. Metrics are
//! exported to the configured observability backend when observability is
//! initialized (see `rewire_core::init_observability`); without it the
//! instruments are inert no-ops.
//!
//! # Metrics Collected
//!
//! - **connection_state**: current connection status (gauge)
//! - **reconnect_attempts / reconnect_success**: reconnection counters
//! - **messages_received / messages_sent**: payload counters
//! - **heartbeats_sent**: keep-alive counter
//! - **auth_failures**: credential-rejection counter
//! - **errors_total**: transport error counter

use opentelemetry::{
    global,
    metrics::{Counter, Gauge, Meter},
    KeyValue,
};

use crate::connection_state::ConnectionState;

/// Client metrics for monitoring
pub struct ClientMetrics {
    /// Connection state (0=idle, 1=connecting, 2=open, 3=closing, 4=closed, 5=auth_failed)
    pub connection_state: Gauge<i64>,
    /// Total number of reconnection attempts
    pub reconnect_attempts: Counter<u64>,
    /// Total number of successful reconnections
    pub reconnect_success: Counter<u64>,
    /// Total number of messages delivered to the host
    pub messages_received: Counter<u64>,
    /// Total number of messages sent by the host
    pub messages_sent: Counter<u64>,
    /// Total number of heartbeat payloads sent
    pub heartbeats_sent: Counter<u64>,
    /// Total number of auth-failure closes
    pub auth_failures: Counter<u64>,
    /// Total number of transport errors
    pub errors_total: Counter<u64>,
}

impl ClientMetrics {
    /// Create a new ClientMetrics instance
    pub fn new(service_name: impl Into<String>) -> Self {
        let name: &'static str = Box::leak(service_name.into().into_boxed_str());
        let meter = global::meter(name);
        Self::new_with_meter(&meter)
    }

    /// Create a new ClientMetrics instance with a custom meter
    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            connection_state: meter
                .i64_gauge("rewire.client.connection.state")
                .with_description("Connection state (0=idle, 1=connecting, 2=open, 3=closing, 4=closed, 5=auth_failed)")
                .build(),
            reconnect_attempts: meter
                .u64_counter("rewire.client.reconnect.attempts")
                .with_description("Total number of reconnection attempts")
                .build(),
            reconnect_success: meter
                .u64_counter("rewire.client.reconnect.success")
                .with_description("Total number of successful reconnections")
                .build(),
            messages_received: meter
                .u64_counter("rewire.client.messages.received")
                .with_description("Total number of messages delivered to the host")
                .build(),
            messages_sent: meter
                .u64_counter("rewire.client.messages.sent")
                .with_description("Total number of messages sent by the host")
                .build(),
            heartbeats_sent: meter
                .u64_counter("rewire.client.heartbeats.sent")
                .with_description("Total number of heartbeat payloads sent")
                .build(),
            auth_failures: meter
                .u64_counter("rewire.client.auth.failures")
                .with_description("Total number of auth-failure closes")
                .build(),
            errors_total: meter
                .u64_counter("rewire.client.errors.total")
                .with_description("Total number of transport errors")
                .build(),
        }
    }

    /// Record the current connection state
    pub fn record_state(&self, state: ConnectionState) {
        let value = match state {
            ConnectionState::Idle => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Open => 2,
            ConnectionState::Closing => 3,
            ConnectionState::Closed => 4,
            ConnectionState::AuthFailed => 5,
        };
        self.connection_state.record(value, &[]);
    }

    /// Record a reconnection attempt
    pub fn record_reconnect_attempt(&self, attempt: u32) {
        self.reconnect_attempts
            .add(1, &[KeyValue::new("attempt", i64::from(attempt))]);
    }

    /// Record a successful reconnection
    pub fn record_reconnect_success(&self) {
        self.reconnect_success.add(1, &[]);
    }

    /// Record a message delivered to the host
    pub fn record_message_received(&self) {
        self.messages_received.add(1, &[]);
    }

    /// Record a message sent by the host
    pub fn record_message_sent(&self) {
        self.messages_sent.add(1, &[]);
    }

    /// Record a heartbeat payload sent
    pub fn record_heartbeat(&self) {
        self.heartbeats_sent.add(1, &[]);
    }

    /// Record an auth-failure close
    pub fn record_auth_failure(&self, code: u16) {
        self.auth_failures
            .add(1, &[KeyValue::new("code", i64::from(code))]);
    }

    /// Record a transport error
    pub fn record_error(&self, error_type: &str) {
        self.errors_total
            .add(1, &[KeyValue::new("error_type", error_type.to_string())]);
    }
}
