//! Query engine: which listeners an event reaches.

use super::Informer;
use super::registry::Registry;
use crate::listener::ListenerRef;
use informer_core::{EventType, Filter};
use std::sync::Arc;

/// Listeners reached by an event, with the event's resolved descriptor.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub(crate) type_name: String,
    pub(crate) filter: Option<Arc<Filter>>,
    pub(crate) listeners: Vec<ListenerRef>,
}

impl QueryResult {
    /// The resolved event name; `""` for an untyped filter.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The queried filter, if the event is one.
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_deref()
    }

    /// Matching listeners in delivery order.
    pub fn listeners(&self) -> &[ListenerRef] {
        &self.listeners
    }

    /// Takes the listeners.
    pub fn into_listeners(self) -> Vec<ListenerRef> {
        self.listeners
    }

    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl Registry {
    /// Collects the listeners `ty` reaches: filter listeners first, by slot,
    /// then the simple listeners of its name.
    pub(super) fn query(&self, ty: &EventType) -> QueryResult {
        let type_name = ty.type_name().into_owned();
        let filter = ty.filter().cloned();
        let mut listeners = Vec::new();

        if let Some(emitted) = &filter {
            let slots: Vec<&str> = if type_name.is_empty() {
                self.listen_types.iter().map(String::as_str).collect()
            } else {
                vec![type_name.as_str(), ""]
            };
            for slot in slots {
                let Some(entries) = self.filtered.get(slot) else {
                    continue;
                };
                listeners.extend(
                    entries
                        .iter()
                        .filter(|stored| stored.filter.matches(emitted))
                        .map(|stored| stored.entry.listener.clone()),
                );
            }
        }

        if let Some(entries) = self.simple.get(&type_name) {
            listeners.extend(entries.iter().map(|entry| entry.listener.clone()));
        }

        QueryResult {
            type_name,
            filter,
            listeners,
        }
    }
}

impl Informer {
    /// Snapshot of the listeners `ty` reaches, optionally recording `ty` as
    /// seen.
    ///
    /// Filter listeners come first: those registered under the event's name,
    /// then untyped ones (an untyped event searches every name filter
    /// listeners were registered for). Simple listeners of the name follow.
    /// Registered wrappers are returned as is.
    pub fn query_listeners(&self, ty: impl Into<EventType>, mark_as_seen: bool) -> QueryResult {
        let ty = ty.into();
        let limit = self.config().seen_filter_limit;
        let mut registry = self.registry();
        let result = registry.query(&ty);
        if mark_as_seen {
            registry.mark_seen(&result.type_name, result.filter.as_ref(), limit);
        }
        result
    }

    /// Listeners `ty` reaches, without recording it as seen.
    pub fn listeners(&self, ty: impl Into<EventType>) -> Vec<ListenerRef> {
        self.query_listeners(ty, false).into_listeners()
    }

    /// Number of listeners `ty` reaches.
    pub fn listener_count(&self, ty: impl Into<EventType>) -> usize {
        self.registry().query(&ty.into()).listeners.len()
    }

    /// Simple event names that currently have listeners, in first
    /// registration order.
    pub fn event_names(&self) -> Vec<String> {
        self.registry().event_names()
    }

    /// Every name a filter listener was ever registered under; `""` stands
    /// for untyped filters.
    pub fn listen_types(&self) -> Vec<String> {
        self.registry().listen_types.clone()
    }
}

#[cfg(test)]
mod tests {
    use crate::listener::from_fn;
    use crate::{Informer, ListenerRef};
    use informer_core::filter;

    fn noop() -> ListenerRef {
        ListenerRef::new(from_fn(|_, _| Ok(())))
    }

    #[test]
    fn filter_matches_precede_simple_ones() {
        let informer = Informer::new();
        let simple = informer.on("t", noop());
        let untyped = informer.on(filter! { "id" => 5 }, noop());
        let typed = informer.on(filter! { "type" => "t", "id" => 5 }, noop());

        let result = informer.query_listeners(filter! { "type" => "t", "id" => 5, "x" => 1 }, false);
        assert_eq!(result.type_name(), "t");
        assert_eq!(result.listeners(), &[typed, untyped, simple][..]);
    }

    #[test]
    fn names_only_reach_simple_listeners() {
        let informer = Informer::new();
        informer.on(filter! { "type" => "t" }, noop());
        let simple = informer.on("t", noop());
        assert_eq!(informer.listeners("t"), vec![simple]);
        assert_eq!(informer.listener_count(filter! { "type" => "t" }), 2);
    }

    #[test]
    fn marking_is_optional() {
        let informer = Informer::new();
        informer.query_listeners("t", false);
        assert!(!informer.has_been_seen("t"));
        informer.query_listeners("t", true);
        assert!(informer.has_been_seen("t"));
    }

    #[test]
    fn event_names_skip_emptied_types() {
        let informer = Informer::new();
        let a = informer.on("a", noop());
        informer.on("b", noop());
        informer.remove_listener("a", &a);
        assert_eq!(informer.event_names(), vec!["b".to_string()]);
    }
}
