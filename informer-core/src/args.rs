//! Conversion of emit arguments into positional values.

use crate::value::Value;

/// Converts a Rust value into the positional argument list of an emission.
///
/// Implemented for `()` (no arguments), tuples of up to six values, arrays,
/// vectors and slices of values, and a single [`Value`].
///
/// ```rust
/// use informer_core::{IntoArgs, Value};
///
/// assert!(().into_args().is_empty());
/// assert_eq!(("x", 2).into_args(), vec![Value::from("x"), Value::from(2)]);
/// assert_eq!([1, 2, 3].into_args().len(), 3);
/// ```
pub trait IntoArgs {
    /// Produces the positional values.
    fn into_args(self) -> Vec<Value>;
}

impl IntoArgs for () {
    fn into_args(self) -> Vec<Value> {
        Vec::new()
    }
}

impl IntoArgs for Value {
    fn into_args(self) -> Vec<Value> {
        vec![self]
    }
}

impl<T: Into<Value>> IntoArgs for Vec<T> {
    fn into_args(self) -> Vec<Value> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Value>, const N: usize> IntoArgs for [T; N] {
    fn into_args(self) -> Vec<Value> {
        self.into_iter().map(Into::into).collect()
    }
}

impl IntoArgs for &[Value] {
    fn into_args(self) -> Vec<Value> {
        self.to_vec()
    }
}

macro_rules! impl_into_args_tuple {
    ($($T:ident),+) => {
        impl<$($T: Into<Value>,)+> IntoArgs for ($($T,)+) {
            #[allow(non_snake_case)]
            fn into_args(self) -> Vec<Value> {
                let ($($T,)+) = self;
                vec![$($T.into(),)+]
            }
        }
    };
}

impl_into_args_tuple!(A);
impl_into_args_tuple!(A, B);
impl_into_args_tuple!(A, B, C);
impl_into_args_tuple!(A, B, C, D);
impl_into_args_tuple!(A, B, C, D, E);
impl_into_args_tuple!(A, B, C, D, E, F);
