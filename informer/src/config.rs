//! Emitter configuration.

use crate::emitter::Informer;

/// Settings of an [`Informer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformerConfig {
    /// Event name whose unheard emissions are raised as faults.
    pub error_event: String,
    /// Whether `newListener` / `removeListener` notifications are emitted.
    pub meta_events: bool,
    /// Cap on the remembered filter history, oldest evicted first.
    ///
    /// `None` keeps the complete history.
    pub seen_filter_limit: Option<usize>,
}

impl Default for InformerConfig {
    fn default() -> Self {
        Self {
            error_event: "error".to_string(),
            meta_events: true,
            seen_filter_limit: None,
        }
    }
}

/// Builder for constructing an [`Informer`].
///
/// ```rust
/// use informer::Informer;
///
/// let informer = Informer::builder()
///     .error_event("failure")
///     .meta_events(false)
///     .seen_filter_limit(Some(128))
///     .build();
/// assert_eq!(informer.config().error_event, "failure");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InformerBuilder {
    config: InformerConfig,
}

impl InformerBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rename the reserved error event.
    pub fn error_event(mut self, name: impl Into<String>) -> Self {
        self.config.error_event = name.into();
        self
    }

    /// Enable or disable meta-event notifications.
    pub fn meta_events(mut self, enabled: bool) -> Self {
        self.config.meta_events = enabled;
        self
    }

    /// Bound the filter history.
    pub fn seen_filter_limit(mut self, limit: Option<usize>) -> Self {
        self.config.seen_filter_limit = limit;
        self
    }

    /// Build the emitter.
    pub fn build(self) -> Informer {
        Informer::with_config(self.config)
    }
}
