//! Listeners and the handles the registry stores.
//!
//! A [`Listener`] is called with the dispatch [`Context`] and the positional
//! arguments of the emission. Any `Fn(&Context, &[Value]) -> Result<(), BoxError>`
//! is a listener; closures are easiest to write through [`from_fn`], which
//! pins down their signature for inference.
//!
//! Subscriptions are identified by [`ListenerRef`], a shared handle compared
//! by identity: keep the handle returned by `on` to remove the subscription
//! later.

use crate::context::Context;
use informer_core::{BoxError, Value};
use informer_std::Named;
use std::fmt;
use std::sync::Arc;

/// Reacts to emitted events.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an Informer `Listener`",
    label = "missing `Listener` implementation",
    note = "Closures need the shape `Fn(&Context, &[Value]) -> Result<(), BoxError>`; `from_fn` helps inference."
)]
pub trait Listener: Send + Sync + 'static {
    /// Handles one emission.
    ///
    /// Returning an error fails the emission; see [`crate::EmitError`].
    fn on_event(&self, ctx: &Context, args: &[Value]) -> Result<(), BoxError>;

    /// Name used in logs and error reports.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> Listener for F
where
    F: Fn(&Context, &[Value]) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn on_event(&self, ctx: &Context, args: &[Value]) -> Result<(), BoxError> {
        self(ctx, args)
    }
}

impl<L: Listener> Listener for Named<L> {
    fn on_event(&self, ctx: &Context, args: &[Value]) -> Result<(), BoxError> {
        self.inner().on_event(ctx, args)
    }

    fn name(&self) -> &str {
        Named::name(self)
    }
}

/// A listener built from a closure. See [`from_fn`].
pub struct FromFn<F>(F);

impl<F> Listener for FromFn<F>
where
    F: Fn(&Context, &[Value]) -> Result<(), BoxError> + Send + Sync + 'static,
{
    #[inline]
    fn on_event(&self, ctx: &Context, args: &[Value]) -> Result<(), BoxError> {
        (self.0)(ctx, args)
    }

    fn name(&self) -> &str {
        "anonymous"
    }
}

/// Turns a closure into a [`Listener`].
///
/// ```rust
/// use informer::{Informer, from_fn};
///
/// let informer = Informer::new();
/// informer.on("ready", from_fn(|ctx, args| {
///     assert_eq!(ctx.type_name(), "ready");
///     assert!(args.is_empty());
///     Ok(())
/// }));
/// informer.emit("ready", ()).unwrap();
/// ```
#[inline]
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: Fn(&Context, &[Value]) -> Result<(), BoxError> + Send + Sync + 'static,
{
    FromFn(f)
}

/// Gives a listener a name for logs and error reports.
pub fn named<L: Listener>(name: impl Into<std::borrow::Cow<'static, str>>, listener: L) -> Named<L> {
    Named::new(name, listener)
}

/// Shared handle to a registered listener, compared by identity.
#[derive(Clone)]
pub struct ListenerRef(Arc<dyn Listener>);

impl ListenerRef {
    /// Wraps a listener in a fresh handle.
    pub fn new<L: Listener>(listener: L) -> Self {
        Self(Arc::new(listener))
    }

    pub(crate) fn from_arc(listener: Arc<dyn Listener>) -> Self {
        Self(listener)
    }

    /// The listener's name.
    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// Invokes the listener directly.
    pub fn on_event(&self, ctx: &Context, args: &[Value]) -> Result<(), BoxError> {
        self.0.on_event(ctx, args)
    }

    /// Whether both handles point at the same listener.
    pub fn ptr_eq(&self, other: &ListenerRef) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl PartialEq for ListenerRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ListenerRef {}

impl fmt::Debug for ListenerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ListenerRef").field(&self.name()).finish()
    }
}

/// Anything that can be subscribed: a listener, or a handle to one.
pub trait IntoListener {
    /// Produces the handle the registry stores.
    fn into_listener(self) -> ListenerRef;
}

impl<L: Listener> IntoListener for L {
    fn into_listener(self) -> ListenerRef {
        ListenerRef::new(self)
    }
}

impl IntoListener for ListenerRef {
    fn into_listener(self) -> ListenerRef {
        self
    }
}

impl IntoListener for &ListenerRef {
    fn into_listener(self) -> ListenerRef {
        self.clone()
    }
}
