//! Limited and replaying subscriptions.
//!
//! `once` and `many` install a counting wrapper that unsubscribes itself
//! once its budget is spent. `after` does the same and, when the event was
//! already emitted, immediately replays it to the new listener under a
//! [`Context`] flagged past. Arguments of past emissions are not retained,
//! so a replay carries none.

use super::Informer;
use super::registry::Entry;
use crate::context::Context;
use crate::listener::{IntoListener, Listener, ListenerRef};
use informer_core::{BoxError, EmitError, EventType, Value};
use informer_std::Named;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

struct Countdown {
    original: ListenerRef,
    event: EventType,
    /// `None` means unlimited.
    remaining: Option<AtomicUsize>,
    /// The registered wrapper around this countdown.
    wrapper: Weak<dyn Listener>,
}

impl Listener for Countdown {
    fn on_event(&self, ctx: &Context, args: &[Value]) -> Result<(), BoxError> {
        if let Some(remaining) = &self.remaining {
            match remaining.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1)) {
                Err(_) => return Ok(()),
                Ok(1) => {
                    if let Some(wrapper) = self.wrapper.upgrade() {
                        ctx.informer()
                            .remove_listener(&self.event, &ListenerRef::from_arc(wrapper));
                    }
                }
                Ok(_) => {}
            }
        }
        self.original.on_event(ctx, args)
    }
}

impl Informer {
    fn install(
        &self,
        kind: &str,
        ty: EventType,
        times: Option<usize>,
        original: ListenerRef,
    ) -> ListenerRef {
        let name = format!("{kind}({})", original.name());
        let countdown: Arc<Named<Countdown>> = Arc::new_cyclic(|me: &Weak<Named<Countdown>>| {
            let wrapper: Weak<dyn Listener> = me.clone();
            Named::new(
                name,
                Countdown {
                    original: original.clone(),
                    event: ty.clone(),
                    remaining: times.map(AtomicUsize::new),
                    wrapper,
                },
            )
        });
        let wrapper = ListenerRef::from_arc(countdown);
        self.subscribe(ty, Entry::wrapping(wrapper.clone(), original));
        wrapper
    }

    /// Subscribe for the next emission only.
    ///
    /// Returns the handle of `listener`, which also removes the subscription.
    pub fn once(&self, ty: impl Into<EventType>, listener: impl IntoListener) -> ListenerRef {
        self.limited("once", ty.into(), 1, listener.into_listener())
    }

    /// Subscribe for the next `times` emissions. Zero subscribes nothing.
    pub fn many(
        &self,
        ty: impl Into<EventType>,
        times: usize,
        listener: impl IntoListener,
    ) -> ListenerRef {
        self.limited("many", ty.into(), times, listener.into_listener())
    }

    fn limited(&self, kind: &str, ty: EventType, times: usize, original: ListenerRef) -> ListenerRef {
        if times > 0 {
            self.install(kind, ty, Some(times), original.clone());
        }
        original
    }

    /// Subscribe for `times` emissions (`None`: without limit), replaying a
    /// past emission first.
    ///
    /// When `ty` was already emitted, the listener is called right away with
    /// a context whose [`Context::is_past`] is set and no arguments. That
    /// call counts toward `times`; its failure is returned, the subscription
    /// stays in place.
    ///
    /// ```rust
    /// use informer::{Informer, from_fn};
    ///
    /// let informer = Informer::new();
    /// informer.emit("ready", ()).unwrap();
    /// informer
    ///     .after("ready", None, from_fn(|ctx, args| {
    ///         assert!(ctx.is_past());
    ///         assert!(args.is_empty());
    ///         Ok(())
    ///     }))
    ///     .unwrap();
    /// ```
    pub fn after(
        &self,
        ty: impl Into<EventType>,
        times: Option<usize>,
        listener: impl IntoListener,
    ) -> Result<ListenerRef, EmitError> {
        let ty = ty.into();
        let original = listener.into_listener();
        if times == Some(0) {
            return Ok(original);
        }

        let seen = self.has_been_seen(&ty);
        let wrapper = self.install("after", ty.clone(), times, original.clone());
        if seen {
            trace!(event = %ty, listener = wrapper.name(), "replaying past emission");
            let ctx = Context::replay(self, &ty, wrapper.name());
            wrapper
                .on_event(&ctx, &[])
                .map_err(|err| EmitError::listener(wrapper.name(), err))?;
        }
        Ok(original)
    }

    /// [`Informer::after`] for a single emission.
    pub fn after_once(
        &self,
        ty: impl Into<EventType>,
        listener: impl IntoListener,
    ) -> Result<ListenerRef, EmitError> {
        self.after(ty, Some(1), listener)
    }

    /// [`Informer::after`] for `times` emissions.
    pub fn after_many(
        &self,
        ty: impl Into<EventType>,
        times: usize,
        listener: impl IntoListener,
    ) -> Result<ListenerRef, EmitError> {
        self.after(ty, Some(times), listener)
    }
}
