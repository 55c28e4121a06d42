//! Per-listener dispatch context.
//!
//! Every listener invocation receives a fresh [`Context`]. It tells the
//! listener what was emitted ([`Context::type_name`], [`Context::filter`])
//! and lets it steer the emission:
//!
//! - [`Context::wait`] declares the listener asynchronous and hands back a
//!   [`Completion`] to report through later. In [`WaitMode::Series`] the next
//!   listener only starts once the completion fires; in [`WaitMode::Parallel`]
//!   later listeners start right away and only the end of the emission waits.
//! - [`Context::stop`] keeps every later listener of the same emission from
//!   starting.
//!
//! A context is cheap to clone and may be moved to another thread along with
//! its completion.

use crate::emitter::Informer;
use crate::emitter::dispatch::Emission;
use bitflags::bitflags;
use informer_core::{BoxError, EmitError, EventType, Filter};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

bitflags! {
    /// Dispatch-control state of one listener invocation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ContextFlags: u8 {
        /// The listener called [`Context::wait`].
        const WAITING = 1 << 0;
        /// The listener's outcome has been reported.
        const DONE = 1 << 1;
        /// The listener asked to stop the emission.
        const STOPPED = 1 << 2;
        /// A catch-up invocation for an event emitted before subscribing.
        const PAST = 1 << 3;
        /// The invocation is over; a later `wait` has nothing to defer.
        const SETTLED = 1 << 4;
    }
}

/// How an asynchronous listener relates to the listeners after it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WaitMode {
    /// Later listeners wait for this one's completion.
    #[default]
    Series,
    /// Later listeners start immediately; the emission still waits.
    Parallel,
}

pub(crate) type Resume = Box<dyn FnOnce(Option<EmitError>) + Send + 'static>;

enum Outcome {
    Pending,
    Parked(Resume),
    Fired(Option<EmitError>),
    Taken,
}

struct TaskState {
    flags: ContextFlags,
    mode: Option<WaitMode>,
    outcome: Outcome,
}

/// Shared state of one listener invocation.
///
/// The dispatcher parks its continuation here while the listener's
/// completion fires from wherever the listener finishes.
pub(crate) struct TaskCell {
    listener: String,
    state: Mutex<TaskState>,
}

impl TaskCell {
    pub(crate) fn new(listener: impl Into<String>, flags: ContextFlags) -> Self {
        Self {
            listener: listener.into(),
            state: Mutex::new(TaskState {
                flags,
                mode: None,
                outcome: Outcome::Pending,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, TaskState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn listener(&self) -> &str {
        &self.listener
    }

    pub(crate) fn flags(&self) -> ContextFlags {
        self.state().flags
    }

    fn insert_flags(&self, flags: ContextFlags) {
        self.state().flags.insert(flags);
    }

    /// Declares the invocation asynchronous; the first mode requested wins.
    ///
    /// Returns `false` once the invocation is settled.
    fn begin_wait(&self, mode: WaitMode) -> bool {
        let mut state = self.state();
        if state.flags.contains(ContextFlags::SETTLED) {
            return false;
        }
        state.flags.insert(ContextFlags::WAITING);
        state.mode.get_or_insert(mode);
        true
    }

    /// Called once the listener returned successfully.
    ///
    /// Returns the requested mode when the listener waited. Otherwise the
    /// invocation is settled and done on the spot.
    pub(crate) fn after_call(&self) -> Option<WaitMode> {
        let mut state = self.state();
        if state.flags.contains(ContextFlags::WAITING) {
            return state.mode;
        }
        state.flags.insert(ContextFlags::SETTLED | ContextFlags::DONE);
        None
    }

    /// Called when the listener returned an error.
    pub(crate) fn settle_failed(&self) {
        self.insert_flags(ContextFlags::SETTLED | ContextFlags::DONE);
    }

    /// Reports the listener's outcome. Only the first report counts.
    fn fire(&self, error: Option<EmitError>) -> bool {
        let resume = {
            let mut state = self.state();
            if state.flags.contains(ContextFlags::DONE) {
                return false;
            }
            state.flags.insert(ContextFlags::DONE | ContextFlags::SETTLED);
            match std::mem::replace(&mut state.outcome, Outcome::Taken) {
                Outcome::Parked(resume) => Some(resume),
                _ => {
                    state.outcome = Outcome::Fired(error.clone());
                    None
                }
            }
        };
        if let Some(resume) = resume {
            resume(error);
        }
        true
    }

    /// Hands the dispatcher's continuation to the invocation. Runs it right
    /// away when the outcome is already known.
    pub(crate) fn park(&self, resume: Resume) {
        let fired = {
            let mut state = self.state();
            match std::mem::replace(&mut state.outcome, Outcome::Taken) {
                Outcome::Fired(error) => Some(error),
                _ => {
                    state.outcome = Outcome::Parked(resume);
                    return;
                }
            }
        };
        if let Some(error) = fired {
            resume(error);
        }
    }
}

/// What a listener sees of the emission it is handling.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    informer: Informer,
    type_name: String,
    filter: Option<Arc<Filter>>,
    task: Arc<TaskCell>,
    emission: Option<Arc<Emission>>,
}

impl Context {
    pub(crate) fn dispatch(
        informer: Informer,
        type_name: String,
        filter: Option<Arc<Filter>>,
        task: Arc<TaskCell>,
        emission: Arc<Emission>,
    ) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                informer,
                type_name,
                filter,
                task,
                emission: Some(emission),
            }),
        }
    }

    /// A context for a catch-up invocation: flagged past, nothing to wait on.
    pub(crate) fn replay(informer: &Informer, ty: &EventType, listener: &str) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                informer: informer.clone(),
                type_name: ty.type_name().into_owned(),
                filter: ty.filter().cloned(),
                task: Arc::new(TaskCell::new(
                    listener,
                    ContextFlags::PAST | ContextFlags::SETTLED,
                )),
                emission: None,
            }),
        }
    }

    /// The emitted event name; the filter's `type`, or `""` when untyped.
    pub fn type_name(&self) -> &str {
        &self.inner.type_name
    }

    /// The emitted filter, if the event was emitted as one.
    pub fn filter(&self) -> Option<&Filter> {
        self.inner.filter.as_deref()
    }

    /// The emitter dispatching this event.
    pub fn informer(&self) -> &Informer {
        &self.inner.informer
    }

    /// Whether this is a catch-up invocation for an event emitted before
    /// the listener subscribed.
    pub fn is_past(&self) -> bool {
        self.flags().contains(ContextFlags::PAST)
    }

    /// Current dispatch-control flags.
    pub fn flags(&self) -> ContextFlags {
        self.inner.task.flags()
    }

    /// Declares the listener asynchronous.
    ///
    /// The returned [`Completion`] must be fired exactly once; until then a
    /// series listener holds back every later listener. Called after the
    /// listener already returned, or on a catch-up invocation, `wait` has
    /// nothing to defer and returns an inert completion.
    pub fn wait(&self, mode: WaitMode) -> Completion {
        let Some(emission) = &self.inner.emission else {
            return Completion::inert();
        };
        if !self.inner.task.begin_wait(mode) {
            debug!(
                listener = self.inner.task.listener(),
                "wait called after the listener settled"
            );
            return Completion::inert();
        }
        emission.mark_async();
        Completion {
            task: Some(self.inner.task.clone()),
            emission: Some(emission.clone()),
        }
    }

    /// Keeps every later listener of this emission from starting.
    ///
    /// Listeners already running, parallel ones included, are unaffected.
    pub fn stop(&self) {
        self.inner.task.insert_flags(ContextFlags::STOPPED);
        if let Some(emission) = &self.inner.emission {
            debug!(
                event = %self.inner.type_name,
                listener = self.inner.task.listener(),
                "listener stopped the emission"
            );
            emission.request_stop();
        }
    }

    /// Whether this listener called [`Context::stop`].
    pub fn is_stopped(&self) -> bool {
        self.flags().contains(ContextFlags::STOPPED)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("type_name", &self.inner.type_name)
            .field("filter", &self.inner.filter)
            .field("flags", &self.flags())
            .finish()
    }
}

/// Reports the outcome of an asynchronous listener.
///
/// Obtained from [`Context::wait`]. Clones share the same outcome: only the
/// first report counts, later ones are ignored.
///
/// When the report runs an emission started with [`Informer::emit`] to its
/// end after `emit` returned, the emission's fault (if any) is returned from
/// that report. Reports that do not end the emission return `Ok(())`.
#[derive(Clone)]
pub struct Completion {
    task: Option<Arc<TaskCell>>,
    emission: Option<Arc<Emission>>,
}

impl Completion {
    fn inert() -> Self {
        Self {
            task: None,
            emission: None,
        }
    }

    /// Reports success.
    pub fn done(&self) -> Result<(), EmitError> {
        self.settle(None)
    }

    /// Reports a failure.
    pub fn fail(&self, err: impl Into<BoxError>) -> Result<(), EmitError> {
        self.settle(Some(err.into()))
    }

    /// Reports success or failure.
    pub fn settle(&self, error: Option<BoxError>) -> Result<(), EmitError> {
        let Some(task) = &self.task else {
            return Ok(());
        };
        let error = error.map(|err| EmitError::listener(task.listener(), err));
        if !task.fire(error) {
            return Ok(());
        }
        match self
            .emission
            .as_ref()
            .and_then(|emission| emission.take_detached_fault())
        {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    /// Whether the outcome has been reported, or there is nothing to report.
    pub fn is_done(&self) -> bool {
        self.task
            .as_ref()
            .is_none_or(|task| task.flags().contains(ContextFlags::DONE))
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("inert", &self.task.is_none())
            .field("done", &self.is_done())
            .finish()
    }
}
