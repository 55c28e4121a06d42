//! Slice helpers, as opt-in extension traits.

use informer_core::Value;

/// Collects anything iterable into a `Vec`.
pub fn cast<T>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    items.into_iter().collect()
}

/// Set-like helpers over slices, comparing with `PartialEq`.
///
/// Results keep the order of the receiving slice. These are linear scans,
/// meant for the short lists they are used on.
pub trait SliceExt<T> {
    /// Items of `self` that are not in `other`.
    fn difference(&self, other: &[T]) -> Vec<T>;

    /// Items present in both, without duplicates.
    fn shared(&self, other: &[T]) -> Vec<T>;

    /// Items present in exactly one of the two: `self`'s first, then `other`'s.
    fn exclusive(&self, other: &[T]) -> Vec<T>;

    /// Up to `n` leading items.
    fn first_n(&self, n: usize) -> &[T];

    /// Up to `n` trailing items.
    fn last_n(&self, n: usize) -> &[T];
}

impl<T: PartialEq + Clone> SliceExt<T> for [T] {
    fn difference(&self, other: &[T]) -> Vec<T> {
        self.iter().filter(|item| !other.contains(item)).cloned().collect()
    }

    fn shared(&self, other: &[T]) -> Vec<T> {
        let mut out: Vec<T> = Vec::new();
        for item in self {
            if other.contains(item) && !out.contains(item) {
                out.push(item.clone());
            }
        }
        out
    }

    fn exclusive(&self, other: &[T]) -> Vec<T> {
        let mut out = self.difference(other);
        out.extend(other.difference(self));
        out
    }

    fn first_n(&self, n: usize) -> &[T] {
        &self[..n.min(self.len())]
    }

    fn last_n(&self, n: usize) -> &[T] {
        &self[self.len().saturating_sub(n)..]
    }
}

/// Helpers for argument lists.
pub trait ValueSliceExt {
    /// Drops `Undefined` and `Null` entries.
    fn clean(&self) -> Vec<Value>;

    /// Whether any entry is loosely equal to `needle`.
    fn loose_contains(&self, needle: &Value) -> bool;
}

impl ValueSliceExt for [Value] {
    fn clean(&self) -> Vec<Value> {
        self.iter().filter(|v| !v.is_nullish()).cloned().collect()
    }

    fn loose_contains(&self, needle: &Value) -> bool {
        self.iter().any(|v| v.loose_eq(needle))
    }
}
