//! Seen-event tracking.
//!
//! Every emission marks its event name as seen and, when emitted as a
//! filter, appends that filter to the history. `after` and `emit_once`
//! consult it.

use super::Informer;
use super::registry::Registry;
use informer_core::{EventType, Filter};
use std::sync::Arc;

impl Registry {
    pub(super) fn mark_seen(&mut self, type_name: &str, filter: Option<&Arc<Filter>>, limit: Option<usize>) {
        if !self.simple_seen.contains(type_name) {
            self.simple_seen.insert(type_name.to_owned());
        }
        let Some(filter) = filter else {
            return;
        };
        self.filter_seen.push_back(filter.clone());
        if let Some(limit) = limit {
            while self.filter_seen.len() > limit {
                let evicted = self.filter_seen.pop_front();
                trace!(filter = ?evicted, limit, "filter history evicted");
                #[cfg(not(feature = "tracing"))]
                let _ = evicted;
            }
        }
    }

    pub(super) fn has_been_seen(&self, ty: &EventType) -> bool {
        let Some(query) = ty.filter() else {
            return self.simple_seen.contains(ty.type_name().as_ref());
        };
        let wanted = query.type_name();
        self.filter_seen.iter().any(|seen| {
            let seen_type = seen.type_name();
            let in_scope = if wanted.is_empty() {
                seen_type.is_empty() || self.listen_types.iter().any(|t| *t == seen_type)
            } else {
                seen_type == wanted || seen_type.is_empty()
            };
            in_scope && query.matches_attributes(seen)
        })
    }
}

impl Informer {
    /// Whether `ty` was emitted before.
    ///
    /// A name is seen once any emission used it. A filter is seen once a
    /// filter carrying every one of its attributes (loosely equal) was
    /// emitted, either under the same `type` or untyped. An untyped query
    /// looks under every name filter listeners were registered for.
    pub fn has_been_seen(&self, ty: impl Into<EventType>) -> bool {
        self.registry().has_been_seen(&ty.into())
    }
}
