//! Host callback surface
//!
//! The host subscribes to the subset of lifecycle events it cares about by
//! registering callbacks on the builder; every event defaults to a no-op.
//! There is at most one active subscriber per event.
//!
//! Each invocation is isolated with `catch_unwind`: a panicking host
//! callback is logged and swallowed, never allowed to abort an in-progress
//! lifecycle transition or tear down the connection task.

use std::panic::{catch_unwind, AssertUnwindSafe};

use rewire_core::{CloseEvent, Error, Payload};

/// Callback invoked when the transport opens (initial connect or reconnect).
pub type OpenFn = Box<dyn FnMut() + Send>;
/// Callback invoked for each inbound message: the decoded payload plus the
/// raw frame text.
pub type MessageFn = Box<dyn FnMut(Payload, &str) + Send>;
/// Callback invoked on ordinary transport closes.
pub type CloseFn = Box<dyn FnMut(&CloseEvent) + Send>;
/// Callback invoked on transport errors.
pub type ErrorFn = Box<dyn FnMut(&Error) + Send>;
/// Callback invoked when a close carries a reserved auth-failure code.
pub type AuthFailureFn = Box<dyn FnMut(u16, &str) + Send>;

/// The registered callbacks, owned by the connection task
pub(crate) struct EventHandlers {
    pub on_open: OpenFn,
    pub on_message: MessageFn,
    pub on_close: CloseFn,
    pub on_error: ErrorFn,
    pub on_auth_failure: AuthFailureFn,
}

impl Default for EventHandlers {
    fn default() -> Self {
        Self {
            on_open: Box::new(|| {}),
            on_message: Box::new(|_, _| {}),
            on_close: Box::new(|_| {}),
            on_error: Box::new(|_| {}),
            on_auth_failure: Box::new(|_, _| {}),
        }
    }
}

impl EventHandlers {
    pub fn open(&mut self) {
        guarded("on_open", || (self.on_open)());
    }

    pub fn message(&mut self, payload: Payload, raw: &str) {
        guarded("on_message", || (self.on_message)(payload, raw));
    }

    pub fn close(&mut self, event: &CloseEvent) {
        guarded("on_close", || (self.on_close)(event));
    }

    pub fn error(&mut self, error: &Error) {
        guarded("on_error", || (self.on_error)(error));
    }

    pub fn auth_failure(&mut self, code: u16, reason: &str) {
        guarded("on_auth_failure", || (self.on_auth_failure)(code, reason));
    }
}

/// Run a host callback, isolating panics from the connection task.
fn guarded(callback: &str, f: impl FnOnce()) {
    if let Err(panic) = catch_unwind(AssertUnwindSafe(f)) {
        tracing::error!(callback, panic = panic_message(&panic), "host callback panicked");
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "<opaque panic payload>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_defaults_are_noops() {
        let mut handlers = EventHandlers::default();
        handlers.open();
        handlers.message(Payload::Text("x".into()), "x");
        handlers.close(&CloseEvent::abnormal());
        handlers.error(&Error::ConnectionClosed);
        handlers.auth_failure(4401, "missing token");
    }

    #[test]
    fn test_registered_callback_receives_arguments() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut handlers = EventHandlers {
            on_message: Box::new(move |payload, raw| {
                sink.lock().unwrap().push((payload, raw.to_owned()));
            }),
            ..Default::default()
        };

        handlers.message(Payload::Json(json!({"a": 1})), r#"{"a":1}"#);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, Payload::Json(json!({"a": 1})));
        assert_eq!(seen[0].1, r#"{"a":1}"#);
    }

    #[test]
    fn test_panicking_callback_is_isolated() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let mut handlers = EventHandlers {
            on_open: Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                panic!("host bug");
            }),
            ..Default::default()
        };

        // Neither invocation may propagate the panic.
        handlers.open();
        handlers.open();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_panic_message_extraction() {
        let panic = catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(&*panic), "boom");

        let panic = catch_unwind(|| panic!("{} {}", "formatted", 1)).unwrap_err();
        assert_eq!(panic_message(&*panic), "formatted 1");
    }
}
