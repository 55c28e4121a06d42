//! Dynamically typed event values and their coercing equality.

use crate::error::{BoxError, SharedError};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A dynamically typed value carried by events and filters.
///
/// Primitive variants compare by content; [`Value::Error`] and
/// [`Value::Opaque`] compare by identity, like objects do.
#[derive(Clone, Default)]
pub enum Value {
    /// No value at all.
    #[default]
    Undefined,
    /// An explicit empty value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number. Integers are represented exactly up to 2^53.
    Number(f64),
    /// A string.
    Str(String),
    /// An error object.
    Error(SharedError),
    /// Any other payload, compared by identity.
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Wraps an error as a value.
    pub fn error(err: impl Into<BoxError>) -> Self {
        Value::Error(Arc::from(err.into()))
    }

    /// Wraps an arbitrary payload as a value.
    pub fn opaque<T: Any + Send + Sync>(payload: T) -> Self {
        Value::Opaque(Arc::new(payload))
    }

    /// `true` for [`Value::Undefined`] and [`Value::Null`].
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Returns the string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the error, if this is an error.
    pub fn as_error(&self) -> Option<&SharedError> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Borrows an opaque payload as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Opaque(payload) => (**payload).downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Numeric conversion used by [`Value::loose_eq`].
    ///
    /// `Undefined` and non-numeric strings become `NaN`, `Null` becomes 0,
    /// booleans become 1 or 0. Errors and opaque payloads are `NaN`.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::Str(s) => parse_number(s),
            Value::Error(_) | Value::Opaque(_) => f64::NAN,
        }
    }

    /// Coercing equality.
    ///
    /// - `Undefined` and `Null` equal each other and nothing else.
    /// - Booleans are converted to 1/0 before comparing with non-booleans.
    /// - A number and a string compare numerically.
    /// - Errors equal the same error, or a string/number equal to their message.
    /// - Opaque payloads equal only themselves.
    pub fn loose_eq(&self, other: &Value) -> bool {
        use Value::{Bool, Error, Null, Number, Opaque, Str, Undefined};

        match (self, other) {
            (Undefined | Null, Undefined | Null) => true,
            (Undefined | Null, _) | (_, Undefined | Null) => false,
            (Bool(a), Bool(b)) => a == b,
            (Bool(_), _) => Number(self.to_number()).loose_eq(other),
            (_, Bool(_)) => self.loose_eq(&Number(other.to_number())),
            (Number(a), Number(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Number(a), Str(_)) => *a == other.to_number(),
            (Str(_), Number(b)) => self.to_number() == *b,
            (Error(a), Error(b)) => same_allocation(a, b),
            (Error(e), Str(_) | Number(_)) => Str(e.to_string()).loose_eq(other),
            (Str(_) | Number(_), Error(e)) => self.loose_eq(&Str(e.to_string())),
            (Opaque(a), Opaque(b)) => same_allocation(a, b),
            _ => false,
        }
    }

    /// Strict equality: same variant and same content, identity for objects.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => same_allocation(a, b),
            (Value::Opaque(a), Value::Opaque(b)) => same_allocation(a, b),
            _ => false,
        }
    }
}

fn same_allocation<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// String to number conversion with the same leniency as the loose equality:
/// surrounding whitespace is ignored, the empty string is zero, and radix
/// prefixes are understood. Anything unparsable is `NaN`.
fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return f64::NAN;
            }
            return u64::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
        }
    }
    let numeric = trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if numeric {
        trimmed.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_eq(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Error(e) => f.debug_tuple("Error").field(&e.to_string()).finish(),
            Value::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write_number(f, *n),
            Value::Str(s) => f.write_str(s),
            Value::Error(e) => write!(f, "{e}"),
            Value::Opaque(_) => f.write_str("[object]"),
        }
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Undefined
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Undefined, Into::into)
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(n as f64)
                }
            }
        )+
    };
}

impl_from_number!(f64, f32, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullish_values_only_equal_each_other() {
        assert!(Value::Undefined.loose_eq(&Value::Null));
        assert!(Value::Null.loose_eq(&Value::Undefined));
        assert!(!Value::Null.loose_eq(&Value::from(0)));
        assert!(!Value::Undefined.loose_eq(&Value::from("")));
        assert!(!Value::from(false).loose_eq(&Value::Undefined));
    }

    #[test]
    fn numbers_and_strings_coerce() {
        assert!(Value::from(5).loose_eq(&Value::from("5")));
        assert!(Value::from(" 5 ").loose_eq(&Value::from(5.0)));
        assert!(Value::from("").loose_eq(&Value::from(0)));
        assert!(Value::from("0x10").loose_eq(&Value::from(16)));
        assert!(Value::from("1e3").loose_eq(&Value::from(1000)));
        assert!(!Value::from("5px").loose_eq(&Value::from(5)));
        assert!(!Value::from("inf").loose_eq(&Value::from(f64::INFINITY)));
        assert!(Value::from("Infinity").loose_eq(&Value::from(f64::INFINITY)));
    }

    #[test]
    fn strings_compare_by_content() {
        assert!(Value::from("a").loose_eq(&Value::from(String::from("a"))));
        assert!(!Value::from("1.0").loose_eq(&Value::from("1")));
    }

    #[test]
    fn booleans_become_numbers() {
        assert!(Value::from(true).loose_eq(&Value::from(1)));
        assert!(Value::from(true).loose_eq(&Value::from("1")));
        assert!(Value::from(false).loose_eq(&Value::from("0")));
        assert!(!Value::from(true).loose_eq(&Value::from("true")));
    }

    #[test]
    fn nan_is_never_equal() {
        let nan = Value::from(f64::NAN);
        assert!(!nan.loose_eq(&nan));
        assert!(!nan.strict_eq(&nan));
    }

    #[test]
    fn objects_compare_by_identity() {
        let a = Value::opaque(7_u32);
        let b = Value::opaque(7_u32);
        assert!(a.loose_eq(&a.clone()));
        assert!(!a.loose_eq(&b));
        assert_eq!(a.downcast_ref::<u32>(), Some(&7));
        assert_eq!(a.downcast_ref::<i64>(), None);
    }

    #[test]
    fn errors_compare_with_their_message() {
        let err = Value::error("boom");
        assert!(err.loose_eq(&err.clone()));
        assert!(err.loose_eq(&Value::from("boom")));
        assert!(!err.loose_eq(&Value::error("boom")));
    }

    #[test]
    fn strict_equality_keeps_variants_apart() {
        assert_eq!(Value::from(1), Value::from(1.0));
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::Undefined, Value::Null);
    }

    #[test]
    fn display_renders_like_script_text() {
        assert_eq!(Value::from(5).to_string(), "5");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::from(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::Undefined.to_string(), "undefined");
        assert_eq!(Value::from(None::<i32>).to_string(), "undefined");
    }
}
