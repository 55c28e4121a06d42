//! Named callables.
//!
//! [`Named`] attaches a debug name and a parameter list to any value,
//! typically a closure. Wrappers synthesized at runtime (such as the
//! counting shims behind `once` and `after`) use it so that error reports
//! and logs name something recognizable instead of a closure type path.

use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// A name that is not a valid identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("`{0}` is not a valid function name")]
pub struct InvalidName(pub String);

/// A value carrying a name and the names of its parameters.
#[derive(Clone)]
pub struct Named<F> {
    name: Cow<'static, str>,
    params: Vec<Cow<'static, str>>,
    inner: F,
}

impl<F> Named<F> {
    /// Names `inner` without validating the name.
    pub fn new(name: impl Into<Cow<'static, str>>, inner: F) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            inner,
        }
    }

    /// Names `inner`, rejecting names that are not identifiers.
    pub fn try_new(name: impl Into<Cow<'static, str>>, inner: F) -> Result<Self, InvalidName> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(InvalidName(name.into_owned()));
        }
        Ok(Self::new(name, inner))
    }

    /// Declares the parameter names; the arity follows from them.
    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    /// The name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared parameter names.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.as_ref())
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Borrows the wrapped value.
    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Unwraps the value.
    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F> fmt::Debug for Named<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(param)?;
        }
        f.write_str(")")
    }
}

/// Whether `name` is an identifier: a letter, `_` or `$`, followed by
/// letters, digits, `_` or `$`.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
