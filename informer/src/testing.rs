//! Testing utilities for Informer.
//!
//! # Features
//!
//! - [`RecordingListener`]: records every call it receives
//! - [`CountingListener`]: counts calls, optionally failing each one

use crate::context::Context;
use crate::listener::Listener;
use informer_core::{BoxError, Filter, Value};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Recording Listener
// ============================================================================

/// One recorded listener call.
#[derive(Debug, Clone)]
pub struct Call {
    /// The emitted event name.
    pub type_name: String,
    /// The emitted filter, if any.
    pub filter: Option<Filter>,
    /// The positional arguments.
    pub args: Vec<Value>,
    /// Whether the call replayed a past emission.
    pub past: bool,
}

/// A listener that records every call.
///
/// Clones share the record, so keep one clone and subscribe another.
///
/// # Example
///
/// ```rust
/// use informer::Informer;
/// use informer::testing::RecordingListener;
///
/// let informer = Informer::new();
/// let recorder = RecordingListener::new();
/// informer.on("ping", recorder.clone());
/// informer.emit("ping", (1,)).unwrap();
///
/// assert_eq!(recorder.count(), 1);
/// assert_eq!(recorder.last().unwrap().type_name, "ping");
/// ```
#[derive(Clone, Default)]
pub struct RecordingListener {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingListener {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self) -> MutexGuard<'_, Vec<Call>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a clone of the recorded calls.
    pub fn calls(&self) -> Vec<Call> {
        self.record().clone()
    }

    /// Get the number of recorded calls.
    pub fn count(&self) -> usize {
        self.record().len()
    }

    /// The most recent call.
    pub fn last(&self) -> Option<Call> {
        self.record().last().cloned()
    }

    /// Clear all recorded calls.
    pub fn clear(&self) {
        self.record().clear();
    }
}

impl Listener for RecordingListener {
    fn on_event(&self, ctx: &Context, args: &[Value]) -> Result<(), BoxError> {
        self.record().push(Call {
            type_name: ctx.type_name().to_owned(),
            filter: ctx.filter().cloned(),
            args: args.to_vec(),
            past: ctx.is_past(),
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "recorder"
    }
}

// ============================================================================
// Counting Listener
// ============================================================================

/// A listener that counts its calls.
#[derive(Clone, Default)]
pub struct CountingListener {
    count: Arc<AtomicUsize>,
    error: Option<Arc<str>>,
}

impl CountingListener {
    /// Create a counter that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counter that fails every call with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            count: Arc::default(),
            error: Some(Arc::from(message.into())),
        }
    }

    /// Get the number of calls.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Listener for CountingListener {
    fn on_event(&self, _ctx: &Context, _args: &[Value]) -> Result<(), BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        match &self.error {
            Some(message) => Err(message.to_string().into()),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "counter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Informer;
    use informer_core::filter;

    #[test]
    fn recorder_captures_context() {
        let informer = Informer::new();
        let recorder = RecordingListener::new();
        informer.on(filter! { "type" => "job", "id" => 1 }, recorder.clone());
        informer.emit(filter! { "type" => "job", "id" => 1, "by" => "me" }, ("a", 2)).unwrap();

        let call = recorder.last().unwrap();
        assert_eq!(call.type_name, "job");
        assert_eq!(call.filter.unwrap().get("by"), Some(&Value::from("me")));
        assert_eq!(call.args, vec![Value::from("a"), Value::from(2)]);
        assert!(!call.past);

        recorder.clear();
        assert_eq!(recorder.count(), 0);
    }

    #[test]
    fn failing_counter_still_counts() {
        let informer = Informer::new();
        let counter = CountingListener::failing("nope");
        informer.on("t", counter.clone());
        let err = informer.emit("t", ()).unwrap_err();
        assert_eq!(err.to_string(), "listener `counter` failed: nope");
        assert_eq!(counter.count(), 1);
    }
}
