//! Error types for Informer.
//!
//! Emission is the only fallible operation. Its faults are classified by
//! [`EmitError`]:
//!
//! - [`EmitError::Unhandled`] / [`EmitError::UnhandledValue`] - an `error`
//!   event was emitted and nobody was listening
//! - [`EmitError::Listener`] - a listener failed, either by returning an error
//!   or by settling its completion with one
//! - [`EmitError::Combined`] - both a series listener and a parallel listener
//!   failed during the same emission
//! - [`EmitError::Abandoned`] - an awaited emission lost every completion handle

use std::sync::Arc;
use thiserror::Error;

/// A boxed error type for listener failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A shared error, cheap to clone into values, callbacks and reports.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Faults raised or reported by an emission.
#[derive(Error, Debug, Clone)]
pub enum EmitError {
    /// An `error` event carrying an error value had no listener.
    ///
    /// The payload is propagated unchanged.
    #[error(transparent)]
    Unhandled(SharedError),

    /// An `error` event carrying a non-error value had no listener.
    #[error("unhandled error event: {0}")]
    UnhandledValue(String),

    /// A listener failed.
    #[error("listener `{listener}` failed: {source}")]
    Listener {
        /// Debug name of the failing listener.
        listener: String,
        /// What the listener reported.
        #[source]
        source: SharedError,
    },

    /// A series listener and a parallel listener both failed.
    #[error("{0}; {1}")]
    Combined(Box<EmitError>, Box<EmitError>),

    /// Every completion handle of a pending emission was dropped.
    #[error("emission was abandoned before it completed")]
    Abandoned,
}

impl EmitError {
    /// Wraps a listener failure, tagging it with the listener's name.
    pub fn listener(name: impl Into<String>, err: impl Into<BoxError>) -> Self {
        EmitError::Listener {
            listener: name.into(),
            source: Arc::from(err.into()),
        }
    }

    /// Pairs a series failure with a parallel failure, keeping whichever exists.
    pub fn combine(series: Option<Self>, parallel: Option<Self>) -> Option<Self> {
        match (series, parallel) {
            (Some(a), Some(b)) => Some(EmitError::Combined(Box::new(a), Box::new(b))),
            (a, b) => a.or(b),
        }
    }

    /// Flattens a combined error into its parts; any other error yields itself.
    pub fn errors(&self) -> Vec<&EmitError> {
        match self {
            EmitError::Combined(a, b) => {
                let mut all = a.errors();
                all.extend(b.errors());
                all
            }
            other => vec![other],
        }
    }

    /// Whether this fault comes from an unheard `error` event.
    pub fn is_unhandled(&self) -> bool {
        matches!(
            self,
            EmitError::Unhandled(_) | EmitError::UnhandledValue(_)
        )
    }
}
