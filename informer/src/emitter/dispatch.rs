//! Dispatch engine.
//!
//! An emission runs its listeners as a [`run_series`] of tasks, one per
//! listener, in delivery order:
//!
//! 1. A listener that never calls `wait` finishes when it returns.
//! 2. A listener in series mode parks the run until its completion fires.
//! 3. A listener in parallel mode lets the run continue; its completion is
//!    joined with [`run_parallel`] once every listener has started.
//!
//! Nothing is deferred: when every listener finishes before returning, the
//! emission completes before `emit` returns.

use super::Informer;
use super::query::QueryResult;
use crate::context::{Context, ContextFlags, TaskCell, WaitMode};
use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::BoxFuture;
use informer_core::{EmitError, EventType, IntoArgs, Value};
use informer_std::sequence::{Next, Task, run_parallel, run_series, task};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

/// How an emission went, as far as `emit` can tell when it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitStatus {
    /// Nothing listened; no callback was invoked.
    NoListeners,
    /// Every listener reported before `emit` returned.
    Completed {
        /// A listener called `stop`.
        stopped: bool,
        /// A listener called `wait`.
        asynchronous: bool,
    },
    /// Some listener has not reported yet.
    Pending,
    /// `emit_once` found the event already seen.
    Skipped,
}

impl EmitStatus {
    /// Whether the emission is still running.
    pub fn is_pending(&self) -> bool {
        matches!(self, EmitStatus::Pending)
    }

    /// Whether a listener stopped the emission.
    pub fn was_stopped(&self) -> bool {
        matches!(self, EmitStatus::Completed { stopped: true, .. })
    }
}

pub(crate) type Callback = Box<dyn FnOnce(Option<EmitError>, bool) + Send + 'static>;

#[derive(Default)]
struct EmissionState {
    asynchronous: bool,
    stopped: bool,
    side: Vec<Arc<TaskCell>>,
    callback: Option<Callback>,
    finished: bool,
    detached: bool,
    fault: Option<EmitError>,
    finished_on: Option<ThreadId>,
}

/// Shared state of one emission.
pub(crate) struct Emission {
    state: Mutex<EmissionState>,
}

impl Emission {
    fn new(callback: Option<Callback>) -> Self {
        Self {
            state: Mutex::new(EmissionState {
                callback,
                ..EmissionState::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, EmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn mark_async(&self) {
        self.state().asynchronous = true;
    }

    pub(crate) fn request_stop(&self) {
        self.state().stopped = true;
    }

    fn is_stopped(&self) -> bool {
        self.state().stopped
    }

    fn push_side(&self, task: Arc<TaskCell>) {
        self.state().side.push(task);
    }

    fn take_side(&self) -> Vec<Arc<TaskCell>> {
        std::mem::take(&mut self.state().side)
    }

    /// Delivers the outcome: to the callback when there is one, otherwise it
    /// is kept as the emission's fault.
    fn finish(&self, error: Option<EmitError>) {
        let mut state = self.state();
        state.finished = true;
        state.finished_on = Some(thread::current().id());
        let stopped = state.stopped;
        match state.callback.take() {
            Some(callback) => {
                drop(state);
                callback(error, stopped);
            }
            None => {
                if let Some(err) = error.as_ref().filter(|_| state.detached) {
                    warn!(error = %err, "emission failed after emit returned");
                    #[cfg(not(feature = "tracing"))]
                    let _ = err;
                }
                state.fault = error;
            }
        }
    }

    /// Called once `emit` is about to return.
    fn detach(&self) -> Result<EmitStatus, EmitError> {
        let mut state = self.state();
        if !state.finished {
            state.detached = true;
            return Ok(EmitStatus::Pending);
        }
        match state.fault.take() {
            Some(fault) => Err(fault),
            None => Ok(EmitStatus::Completed {
                stopped: state.stopped,
                asynchronous: state.asynchronous,
            }),
        }
    }

    /// The fault of an emission that finished after `emit` returned.
    ///
    /// Only the thread that ran the emission to its end gets it, so a report
    /// racing with the final one never takes the final one's fault.
    pub(crate) fn take_detached_fault(&self) -> Option<EmitError> {
        let mut state = self.state();
        if state.detached && state.finished_on == Some(thread::current().id()) {
            state.fault.take()
        } else {
            None
        }
    }
}

fn resume_with(next: Next<EmitError>) -> crate::context::Resume {
    Box::new(move |error| next(error.map_or(Ok(()), Err)))
}

fn run(
    informer: &Informer,
    query: QueryResult,
    args: Vec<Value>,
    callback: Option<Callback>,
) -> Result<EmitStatus, EmitError> {
    let QueryResult {
        type_name,
        filter,
        listeners,
    } = query;
    debug!(event = %type_name, listeners = listeners.len(), "emitting");

    let emission = Arc::new(Emission::new(callback));
    let args: Arc<[Value]> = args.into();

    let tasks: Vec<Task<EmitError>> = listeners
        .into_iter()
        .map(|listener| {
            let informer = informer.clone();
            let emission = emission.clone();
            let args = args.clone();
            let type_name = type_name.clone();
            let filter = filter.clone();
            task(move |next: Next<EmitError>| {
                if emission.is_stopped() {
                    return next(Ok(()));
                }

                let cell = Arc::new(TaskCell::new(listener.name(), ContextFlags::empty()));
                let ctx = Context::dispatch(informer, type_name, filter, cell.clone(), emission.clone());
                let result = listener.on_event(&ctx, &args);
                drop(ctx);

                if let Err(err) = result {
                    cell.settle_failed();
                    return next(Err(EmitError::listener(listener.name(), err)));
                }
                match cell.after_call() {
                    None => next(Ok(())),
                    Some(WaitMode::Parallel) => {
                        emission.push_side(cell);
                        next(Ok(()))
                    }
                    Some(WaitMode::Series) => cell.park(resume_with(next)),
                }
            })
        })
        .collect();

    let finishing = emission.clone();
    run_series(tasks, move |result| {
        let series_error = result.err();
        let side: Vec<Task<EmitError>> = finishing
            .take_side()
            .into_iter()
            .map(|cell| task(move |next: Next<EmitError>| cell.park(resume_with(next))))
            .collect();
        run_parallel(side, move |result| {
            finishing.finish(EmitError::combine(series_error, result.err()));
        });
    });

    emission.detach()
}

/// The fault raised by an unheard error event.
fn unhandled(args: &[Value]) -> EmitError {
    match args.first() {
        Some(Value::Error(err)) => EmitError::Unhandled(err.clone()),
        Some(other) => EmitError::UnhandledValue(other.to_string()),
        None => EmitError::UnhandledValue(Value::Undefined.to_string()),
    }
}

impl Informer {
    /// Emit `ty` with positional `args`.
    ///
    /// Returns when the emission completes or an asynchronous listener holds it
    /// back ([`EmitStatus::Pending`]). Listener failures surface as `Err`
    /// when the emission completed before returning; a pending emission
    /// reports its failure from the [`crate::Completion`] call that finishes
    /// it. Emitting the error event (`"error"` by default)
    /// with nobody listening fails with its payload.
    ///
    /// ```rust
    /// use informer::{EmitStatus, Informer, Value, from_fn};
    ///
    /// let informer = Informer::new();
    /// informer.on("greet", from_fn(|_, args| {
    ///     assert_eq!(args, &[Value::from("hello"), Value::from(2)]);
    ///     Ok(())
    /// }));
    /// let status = informer.emit("greet", ("hello", 2)).unwrap();
    /// assert_eq!(status, EmitStatus::Completed { stopped: false, asynchronous: false });
    /// ```
    pub fn emit(&self, ty: impl Into<EventType>, args: impl IntoArgs) -> Result<EmitStatus, EmitError> {
        self.dispatch(ty.into(), args.into_args(), None)
    }

    /// Emit `ty` and report the outcome to `callback` as `(error, stopped)`.
    ///
    /// The callback runs exactly once when some listener matched, possibly
    /// before this returns. Listener failures go to the callback instead of
    /// the return value.
    pub fn emit_with<F>(
        &self,
        ty: impl Into<EventType>,
        args: impl IntoArgs,
        callback: F,
    ) -> Result<EmitStatus, EmitError>
    where
        F: FnOnce(Option<EmitError>, bool) + Send + 'static,
    {
        self.dispatch(ty.into(), args.into_args(), Some(Box::new(callback)))
    }

    /// Emit `ty` unless it was seen before.
    pub fn emit_once(&self, ty: impl Into<EventType>, args: impl IntoArgs) -> Result<EmitStatus, EmitError> {
        let ty = ty.into();
        if self.has_been_seen(&ty) {
            return Ok(EmitStatus::Skipped);
        }
        self.dispatch(ty, args.into_args(), None)
    }

    /// Emit `ty` and wait for every listener to report.
    ///
    /// Listeners start right away; the future resolves to whether the
    /// emission was stopped. If every completion of a pending listener is
    /// dropped without reporting, it resolves to [`EmitError::Abandoned`].
    pub fn emit_async(
        &self,
        ty: impl Into<EventType>,
        args: impl IntoArgs,
    ) -> BoxFuture<'static, Result<bool, EmitError>> {
        let (tx, rx) = oneshot::channel();
        let status = self.emit_with(ty, args, move |error, stopped| {
            let _ = tx.send(error.map_or(Ok(stopped), Err));
        });
        async move {
            match status? {
                EmitStatus::NoListeners | EmitStatus::Skipped => Ok(false),
                _ => rx.await.unwrap_or(Err(EmitError::Abandoned)),
            }
        }
        .boxed()
    }

    fn dispatch(&self, ty: EventType, args: Vec<Value>, callback: Option<Callback>) -> Result<EmitStatus, EmitError> {
        let query = self.query_listeners(&ty, true);
        if !query.is_empty() {
            return run(self, query, args, callback);
        }
        if matches!(&ty, EventType::Name(name) if *name == self.config().error_event) {
            let err = unhandled(&args);
            warn!(error = %err, "error event with no listener");
            return Err(err);
        }
        trace!(event = %ty, "no listeners");
        Ok(EmitStatus::NoListeners)
    }
}
