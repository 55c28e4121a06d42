//! Listener registry: subscription and removal.

use super::{Informer, NEW_LISTENER, REMOVE_LISTENER};
use crate::listener::{IntoListener, ListenerRef};
use informer_core::{EventType, Filter, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// A registered listener.
///
/// `original` is set when the registry holds a generated wrapper (`once`,
/// `after`) around the listener the user subscribed; removal accepts either.
#[derive(Clone)]
pub(crate) struct Entry {
    pub(crate) listener: ListenerRef,
    pub(crate) original: Option<ListenerRef>,
}

impl Entry {
    pub(crate) fn new(listener: ListenerRef) -> Self {
        Self {
            listener,
            original: None,
        }
    }

    pub(crate) fn wrapping(wrapper: ListenerRef, original: ListenerRef) -> Self {
        Self {
            listener: wrapper,
            original: Some(original),
        }
    }

    /// Whether this entry is, or wraps, `listener`.
    pub(crate) fn is(&self, listener: &ListenerRef) -> bool {
        self.listener.ptr_eq(listener)
            || self
                .original
                .as_ref()
                .is_some_and(|original| original.ptr_eq(listener))
    }

    /// The listener as the user knows it.
    pub(crate) fn visible(&self) -> &ListenerRef {
        self.original.as_ref().unwrap_or(&self.listener)
    }
}

#[derive(Clone)]
pub(super) struct FilterEntry {
    pub(super) entry: Entry,
    pub(super) filter: Arc<Filter>,
}

impl FilterEntry {
    /// Whether `given` designates this entry's filter: the same allocation,
    /// or a shape this filter matches.
    fn designated_by(&self, given: &Arc<Filter>) -> bool {
        Arc::ptr_eq(&self.filter, given) || self.filter.matches(given)
    }
}

#[derive(Default)]
pub(super) struct Registry {
    /// Simple listeners by event name, in delivery order.
    pub(super) simple: HashMap<String, Vec<Entry>>,
    /// Simple event names in first-registration order.
    pub(super) names: Vec<String>,
    /// Filter listeners by the filter's `type`; `""` holds untyped filters.
    pub(super) filtered: HashMap<String, Vec<FilterEntry>>,
    /// Every name a filter listener was ever registered under.
    pub(super) listen_types: Vec<String>,
    pub(super) simple_seen: HashSet<String>,
    pub(super) filter_seen: VecDeque<Arc<Filter>>,
}

impl Registry {
    fn insert(&mut self, ty: &EventType, entry: Entry) {
        let type_name = ty.type_name().into_owned();
        match ty.filter() {
            None => {
                if !self.names.contains(&type_name) {
                    self.names.push(type_name.clone());
                }
                self.simple.entry(type_name).or_default().push(entry);
            }
            Some(filter) => {
                if !self.listen_types.contains(&type_name) {
                    self.listen_types.push(type_name.clone());
                }
                self.filtered
                    .entry(type_name)
                    .or_default()
                    .push(FilterEntry {
                        entry,
                        filter: filter.clone(),
                    });
            }
        }
    }

    /// Removes entries that are (or wrap) `listener`, scanning backwards.
    fn remove(&mut self, ty: &EventType, listener: &ListenerRef) -> Vec<Entry> {
        let type_name = ty.type_name();
        let mut removed = Vec::new();
        match ty.filter() {
            None => {
                if let Some(entries) = self.simple.get_mut(type_name.as_ref()) {
                    for i in (0..entries.len()).rev() {
                        if entries[i].is(listener) {
                            removed.push(entries.remove(i));
                        }
                    }
                }
            }
            Some(given) => {
                if let Some(entries) = self.filtered.get_mut(type_name.as_ref()) {
                    for i in (0..entries.len()).rev() {
                        if entries[i].entry.is(listener) && entries[i].designated_by(given) {
                            removed.push(entries.remove(i).entry);
                        }
                    }
                }
            }
        }
        removed
    }

    fn remove_all(&mut self, ty: &EventType) -> usize {
        match ty.filter() {
            None => {
                let name = ty.type_name();
                let simple = self.simple.remove(name.as_ref()).map_or(0, |v| v.len());
                let filtered = self.filtered.remove(name.as_ref()).map_or(0, |v| v.len());
                simple + filtered
            }
            Some(given) => {
                let slots: Vec<String> = if given.has_type() {
                    vec![given.type_name().into_owned()]
                } else {
                    self.listen_types.clone()
                };
                let mut count = 0;
                for slot in slots {
                    if let Some(entries) = self.filtered.get_mut(&slot) {
                        let before = entries.len();
                        entries.retain(|entry| !entry.designated_by(given));
                        count += before - entries.len();
                    }
                }
                count
            }
        }
    }

    /// Simple event names that currently have listeners.
    pub(super) fn event_names(&self) -> Vec<String> {
        self.names
            .iter()
            .filter(|name| self.simple.get(*name).is_some_and(|v| !v.is_empty()))
            .cloned()
            .collect()
    }

    fn has_simple_listener(&self, name: &str) -> bool {
        self.simple.get(name).is_some_and(|v| !v.is_empty())
    }
}

impl Informer {
    /// Subscribe `listener` to `ty`, a name or a [`Filter`].
    ///
    /// Returns the handle identifying the subscription. Subscribing the same
    /// handle twice delivers twice.
    ///
    /// ```rust
    /// use informer::{Informer, filter, from_fn};
    ///
    /// let informer = Informer::new();
    /// let handle = informer.on(filter! { "type" => "job", "id" => 5 }, from_fn(|_, _| Ok(())));
    /// assert_eq!(informer.listener_count(filter! { "type" => "job", "id" => 5 }), 1);
    /// assert_eq!(informer.remove_listener(filter! { "type" => "job", "id" => 5 }, &handle), 1);
    /// ```
    pub fn on(&self, ty: impl Into<EventType>, listener: impl IntoListener) -> ListenerRef {
        let listener = listener.into_listener();
        self.subscribe(ty.into(), Entry::new(listener.clone()));
        listener
    }

    /// Alias of [`Informer::on`].
    pub fn add_listener(
        &self,
        ty: impl Into<EventType>,
        listener: impl IntoListener,
    ) -> ListenerRef {
        self.on(ty, listener)
    }

    pub(crate) fn subscribe(&self, ty: EventType, entry: Entry) {
        let type_name = ty.type_name().into_owned();
        self.notify(NEW_LISTENER, &ty, entry.visible(), &type_name);
        trace!(event = %ty, listener = entry.listener.name(), "listener added");
        self.registry().insert(&ty, entry);
    }

    /// Unsubscribe `listener` from `ty`.
    ///
    /// A name removes matching simple listeners. A filter removes matching
    /// filter listeners whose filter is the same allocation as `ty`, or
    /// whose every attribute loosely equals the one in `ty`. Wrappers
    /// installed by `once`/`after` are found through the original listener.
    ///
    /// Returns the number of subscriptions removed.
    pub fn remove_listener(&self, ty: impl Into<EventType>, listener: &ListenerRef) -> usize {
        let ty = ty.into();
        let removed = self.registry().remove(&ty, listener);
        if removed.is_empty() {
            return 0;
        }
        let type_name = ty.type_name().into_owned();
        for entry in &removed {
            trace!(event = %ty, listener = entry.listener.name(), "listener removed");
            self.notify(REMOVE_LISTENER, &ty, entry.visible(), &type_name);
        }
        removed.len()
    }

    /// Unsubscribe everything addressed by `ty`.
    ///
    /// A name removes its simple listeners and every filter listener whose
    /// filter `type` is that name. A filter removes the filter listeners it
    /// designates, across all names when it is untyped.
    ///
    /// Returns the number of subscriptions removed.
    pub fn remove_all_listeners(&self, ty: impl Into<EventType>) -> usize {
        let ty = ty.into();
        let count = self.registry().remove_all(&ty);
        trace!(event = %ty, count, "listeners cleared");
        count
    }

    /// Emits a meta-event when meta-events are on and someone listens.
    ///
    /// Failures of meta listeners are logged, never propagated.
    fn notify(&self, meta: &str, ty: &EventType, listener: &ListenerRef, type_name: &str) {
        if !self.config().meta_events || !self.registry().has_simple_listener(meta) {
            return;
        }
        let args = vec![
            ty.to_value(),
            Value::opaque(listener.clone()),
            Value::from(type_name),
        ];
        if let Err(err) = self.emit(meta, args) {
            warn!(error = %err, meta, "meta-event listener failed");
            #[cfg(not(feature = "tracing"))]
            let _ = err;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::from_fn;
    use informer_core::filter;

    fn noop() -> ListenerRef {
        ListenerRef::new(from_fn(|_, _| Ok(())))
    }

    #[test]
    fn removal_scans_backwards_over_duplicates() {
        let mut registry = Registry::default();
        let ty = EventType::from("t");
        let a = noop();
        let b = noop();
        registry.insert(&ty, Entry::new(a.clone()));
        registry.insert(&ty, Entry::new(b.clone()));
        registry.insert(&ty, Entry::new(a.clone()));

        assert_eq!(registry.remove(&ty, &a).len(), 2);
        let left = &registry.simple["t"];
        assert_eq!(left.len(), 1);
        assert!(left[0].is(&b));
    }

    #[test]
    fn wrappers_are_found_through_the_original() {
        let mut registry = Registry::default();
        let ty = EventType::from("t");
        let original = noop();
        registry.insert(&ty, Entry::wrapping(noop(), original.clone()));

        let removed = registry.remove(&ty, &original);
        assert_eq!(removed.len(), 1);
        assert!(removed[0].visible().ptr_eq(&original));
    }

    #[test]
    fn filter_removal_needs_a_designating_filter() {
        let mut registry = Registry::default();
        let stored = EventType::from(filter! { "type" => "t", "id" => 5 });
        let l = noop();
        registry.insert(&stored, Entry::new(l.clone()));

        let other = EventType::from(filter! { "type" => "t", "id" => 6 });
        assert!(registry.remove(&other, &l).is_empty());

        let loose = EventType::from(filter! { "type" => "t", "id" => "5" });
        assert_eq!(registry.remove(&loose, &l).len(), 1);
    }

    #[test]
    fn remove_all_by_name_crosses_into_filters() {
        let mut registry = Registry::default();
        registry.insert(&EventType::from("t"), Entry::new(noop()));
        registry.insert(&EventType::from(filter! { "type" => "t" }), Entry::new(noop()));
        registry.insert(&EventType::from(filter! { "id" => 1 }), Entry::new(noop()));

        assert_eq!(registry.remove_all(&EventType::from("t")), 2);
        assert!(registry.event_names().is_empty());
        assert_eq!(registry.filtered[""].len(), 1);
    }

    #[test]
    fn untyped_remove_all_visits_every_listen_type() {
        let mut registry = Registry::default();
        registry.insert(&EventType::from(filter! { "type" => "a", "id" => 1 }), Entry::new(noop()));
        registry.insert(&EventType::from(filter! { "type" => "b", "id" => 1 }), Entry::new(noop()));
        registry.insert(&EventType::from(filter! { "type" => "b", "id" => 2 }), Entry::new(noop()));

        registry.insert(&EventType::from(filter! { "id" => 1 }), Entry::new(noop()));

        // Typed filters keep their `type`, so only the untyped one matches.
        let query = EventType::from(filter! { "id" => "1" });
        assert_eq!(registry.remove_all(&query), 1);
        assert_eq!(registry.filtered["a"].len(), 1);
        assert_eq!(registry.filtered["b"].len(), 2);
        assert_eq!(registry.listen_types, vec!["a".to_string(), "b".to_string(), String::new()]);
    }
}
