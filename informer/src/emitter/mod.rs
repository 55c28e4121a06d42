//! The Informer emitter.
//!
//! This module provides:
//! - **Registry**: `on` / `remove_listener` / `remove_all_listeners`
//! - **Seen tracking**: `has_been_seen`, fed by every emission
//! - **Query engine**: `query_listeners` / `listeners`
//! - **Dispatch**: `emit` / `emit_with` / `emit_once` / `emit_async`
//! - **Replay subscriptions**: `once` / `many` / `after`
//!
//! # Locking
//!
//! All registry state sits behind one mutex. It is held only for the
//! duration of a lookup or mutation, never while a listener runs, so
//! listeners are free to subscribe and unsubscribe (a `once` wrapper removes
//! itself) during dispatch. Every emission works on a snapshot of the
//! listeners matching it.

pub(crate) mod dispatch;
mod query;
mod registry;
mod replay;
mod seen;

pub use dispatch::EmitStatus;
pub use query::QueryResult;

use crate::config::{InformerBuilder, InformerConfig};
use registry::Registry;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Meta-event emitted before a listener is added.
///
/// Arguments: the event descriptor (a name, or an opaque [`informer_core::Filter`]),
/// the listener as an opaque [`crate::ListenerRef`] (the user's original for
/// `once`/`after` wrappers), and the resolved event name.
pub const NEW_LISTENER: &str = "newListener";

/// Meta-event emitted after a listener is removed. Same arguments as
/// [`NEW_LISTENER`].
pub const REMOVE_LISTENER: &str = "removeListener";

/// A filtered, replay-aware event emitter.
///
/// Cloning yields another handle to the same emitter.
#[derive(Clone)]
pub struct Informer {
    shared: Arc<Shared>,
}

struct Shared {
    config: InformerConfig,
    registry: Mutex<Registry>,
}

impl Informer {
    /// Create an emitter with default settings.
    pub fn new() -> Self {
        Self::with_config(InformerConfig::default())
    }

    /// Create an emitter from explicit settings.
    pub fn with_config(config: InformerConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                registry: Mutex::new(Registry::default()),
            }),
        }
    }

    /// Start configuring an emitter.
    pub fn builder() -> InformerBuilder {
        InformerBuilder::new()
    }

    /// The emitter's settings.
    pub fn config(&self) -> &InformerConfig {
        &self.shared.config
    }

    /// Whether both handles refer to the same emitter.
    pub fn ptr_eq(&self, other: &Informer) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.shared
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Informer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Informer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry();
        f.debug_struct("Informer")
            .field("config", &self.shared.config)
            .field("event_names", &registry.event_names())
            .field("listen_types", &registry.listen_types)
            .finish_non_exhaustive()
    }
}
