//! Event descriptors: plain names or attribute filters.

use crate::filter::Filter;
use crate::value::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Addresses a subscription or an emission.
///
/// A [`EventType::Name`] reaches simple listeners registered under that
/// name. A [`EventType::Filter`] additionally reaches filter listeners whose
/// filter is a subset of it.
///
/// Filters are held behind an `Arc`: two descriptors cloned from the same
/// filter are the *same* subscription, which is what removal checks first.
#[derive(Debug, Clone)]
pub enum EventType {
    /// A plain event name.
    Name(String),
    /// An attribute filter, optionally scoped by its `type` attribute.
    Filter(Arc<Filter>),
}

impl EventType {
    /// The event name; the filter's `type` attribute, or `""` when untyped.
    pub fn type_name(&self) -> Cow<'_, str> {
        match self {
            EventType::Name(name) => Cow::Borrowed(name),
            EventType::Filter(filter) => filter.type_name(),
        }
    }

    /// The filter, when this descriptor is one.
    pub fn filter(&self) -> Option<&Arc<Filter>> {
        match self {
            EventType::Name(_) => None,
            EventType::Filter(filter) => Some(filter),
        }
    }

    /// Whether this descriptor is a filter.
    pub fn is_filter(&self) -> bool {
        matches!(self, EventType::Filter(_))
    }

    /// Whether both descriptors are the same filter allocation.
    pub fn same_filter(&self, other: &Arc<Filter>) -> bool {
        self.filter().is_some_and(|f| Arc::ptr_eq(f, other))
    }

    /// Renders the descriptor as a value: a string for names, an opaque
    /// [`Filter`] payload otherwise.
    pub fn to_value(&self) -> Value {
        match self {
            EventType::Name(name) => Value::Str(name.clone()),
            EventType::Filter(filter) => Value::Opaque(filter.clone()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Name(name) => f.write_str(name),
            EventType::Filter(filter) => write!(f, "{filter}"),
        }
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        EventType::Name(name.to_owned())
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        EventType::Name(name)
    }
}

impl From<&String> for EventType {
    fn from(name: &String) -> Self {
        EventType::Name(name.clone())
    }
}

impl From<Filter> for EventType {
    fn from(filter: Filter) -> Self {
        EventType::Filter(Arc::new(filter))
    }
}

impl From<Arc<Filter>> for EventType {
    fn from(filter: Arc<Filter>) -> Self {
        EventType::Filter(filter)
    }
}

impl From<&EventType> for EventType {
    fn from(ty: &EventType) -> Self {
        ty.clone()
    }
}
