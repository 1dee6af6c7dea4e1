//! Reconnection backoff policy
//!
//! Delays grow exponentially with the attempt count up to a cap, randomized
//! by a bounded percentage so that many clients dropped by the same outage
//! do not reconnect in lockstep, with a floor guaranteeing a minimum spacing
//! between attempts.
//!
//! The pre-jitter delay for attempt `n` (1-based) is
//! `min(base · 1.5^(n-1), max)`; jitter is symmetric ±10% of that value and
//! the result never goes below 200 ms. The counter resets to zero on every
//! successful open, so each outage starts the progression over.

use std::time::Duration;

use rand::Rng;

/// Growth factor between consecutive attempts.
pub const BACKOFF_FACTOR: f64 = 1.5;
/// Symmetric jitter bound as a fraction of the raw delay.
pub const JITTER_RATIO: f64 = 0.1;
/// Minimum spacing between attempts, after jitter.
pub const MIN_DELAY: Duration = Duration::from_millis(200);

/// Exponential backoff with jitter and an optional attempt cap
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    max_retries: Option<u32>,
    attempt: u32,
}

impl Backoff {
    /// A policy growing from `base` toward `max`, unbounded attempts.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            max_retries: None,
            attempt: 0,
        }
    }

    /// Cap the number of attempts per outage; `None` is unbounded.
    pub fn with_max_retries(mut self, max_retries: Option<u32>) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The attempt counter, incremented by [`Backoff::next_delay`].
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// The pre-jitter delay for a given 1-based attempt number.
    pub fn raw_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let grown = self.base.as_millis() as f64 * BACKOFF_FACTOR.powi(exponent);
        Duration::from_millis(grown.min(self.max.as_millis() as f64) as u64)
    }

    /// Consume one attempt and return the jittered delay before it
    ///
    /// The counter increments before the delay is computed. Returns `None`
    /// once the attempt cap is exhausted; the caller stops retrying.
    pub fn next_delay(&mut self) -> Option<Duration> {
        self.attempt = self.attempt.saturating_add(1);
        if let Some(max_retries) = self.max_retries {
            if self.attempt > max_retries {
                return None;
            }
        }

        let raw = self.raw_delay(self.attempt).as_millis() as f64;
        let jitter = raw * 2.0 * JITTER_RATIO * (rand::thread_rng().gen::<f64>() - 0.5);
        let delay = (raw + jitter).max(MIN_DELAY.as_millis() as f64);
        Some(Duration::from_millis(delay.round() as u64))
    }

    /// Reset the counter after a successful open.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
