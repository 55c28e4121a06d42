//! Attribute filters used to subscribe to and emit shaped events.

use crate::value::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// The reserved attribute naming a filter's event type.
pub const TYPE_KEY: &str = "type";

/// An attribute map describing the shape of an event.
///
/// The reserved [`TYPE_KEY`] attribute scopes a filter to an event name.
/// A filter without it is untyped and, as a subscription, hears every
/// event name.
///
/// # Example
///
/// ```rust
/// use informer_core::Filter;
///
/// let wanted = Filter::of_type("job").with("id", 5);
/// let emitted = Filter::of_type("job").with("id", "5").with("host", "a");
/// assert!(wanted.matches(&emitted));
/// assert!(!emitted.matches(&wanted));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: BTreeMap<String, Value>,
}

impl Filter {
    /// Creates an empty, untyped filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter scoped to the event name `name`.
    pub fn of_type(name: impl Into<String>) -> Self {
        Self::new().with(TYPE_KEY, name.into())
    }

    /// Adds an attribute.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets an attribute, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Removes an attribute.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Reads an attribute.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The event name this filter is scoped to, or `""` when untyped.
    pub fn type_name(&self) -> Cow<'_, str> {
        match self.fields.get(TYPE_KEY) {
            Some(Value::Str(name)) => Cow::Borrowed(name),
            Some(value) if !value.is_nullish() => Cow::Owned(value.to_string()),
            _ => Cow::Borrowed(""),
        }
    }

    /// Whether the filter is scoped to an event name.
    pub fn has_type(&self) -> bool {
        !self.type_name().is_empty()
    }

    /// Key-subset match: every attribute of `self` is loosely equal to the
    /// same attribute of `other`. Attributes only `other` has are ignored;
    /// attributes `other` lacks read as [`Value::Undefined`].
    pub fn matches(&self, other: &Filter) -> bool {
        self.fields.iter().all(|(key, expected)| {
            other
                .fields
                .get(key)
                .unwrap_or(&Value::Undefined)
                .loose_eq(expected)
        })
    }

    /// Like [`Filter::matches`] but ignoring the `type` attribute.
    pub fn matches_attributes(&self, other: &Filter) -> bool {
        self.fields
            .iter()
            .filter(|(key, _)| key.as_str() != TYPE_KEY)
            .all(|(key, expected)| {
                other
                    .fields
                    .get(key)
                    .unwrap_or(&Value::Undefined)
                    .loose_eq(expected)
            })
    }

    /// Iterates attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of attributes, `type` included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the filter has no attributes at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Filter
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filter = Filter::new();
        for (key, value) in iter {
            filter.insert(key, value);
        }
        filter
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
    }
}

/// Builds a [`Filter`] from `key => value` pairs.
///
/// ```rust
/// use informer_core::filter;
///
/// let f = filter! { "type" => "job", "id" => 5 };
/// assert_eq!(f.type_name(), "job");
/// ```
#[macro_export]
macro_rules! filter {
    () => {
        $crate::Filter::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut filter = $crate::Filter::new();
        $( filter.insert($key, $value); )+
        filter
    }};
}
