//! Callback-style task sequencing.
//!
//! A [`Task`] is started with a [`Next`] continuation and reports exactly once
//! through it, either before returning or later from wherever the work
//! finishes. Two runners compose tasks:
//!
//! - [`run_series`] starts each task only after the previous one reported,
//!   and stops at the first error.
//! - [`run_parallel`] starts every task at once and reports after all of
//!   them did.
//!
//! Neither runner defers anything: when every task reports before returning,
//! the whole run (and `on_done`) completes before the runner returns. Callers
//! rely on this to tell a synchronous run from one that is still pending.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

/// Continuation handed to a task; call it once with the task's result.
pub type Next<E> = Box<dyn FnOnce(Result<(), E>) + Send + 'static>;

/// A unit of work reporting through its continuation.
pub type Task<E> = Box<dyn FnOnce(Next<E>) + Send + 'static>;

/// Boxes a closure as a [`Task`].
pub fn task<E, F>(f: F) -> Task<E>
where
    F: FnOnce(Next<E>) + Send + 'static,
{
    Box::new(f)
}

/// Runs `tasks` one at a time, in order.
///
/// The first error ends the run; remaining tasks are never started.
/// `on_done` is called exactly once. Tasks that report before returning do
/// not deepen the stack, however many of them run back to back.
///
/// # Example
///
/// ```rust
/// use informer_std::sequence::{run_series, task};
/// use std::sync::{Arc, Mutex};
///
/// let log = Arc::new(Mutex::new(Vec::new()));
/// let (a, b) = (log.clone(), log.clone());
/// run_series::<(), _>(
///     vec![
///         task(move |next| { a.lock().unwrap().push(1); next(Ok(())) }),
///         task(move |next| { b.lock().unwrap().push(2); next(Ok(())) }),
///     ],
///     |result| assert!(result.is_ok()),
/// );
/// assert_eq!(*log.lock().unwrap(), vec![1, 2]);
/// ```
pub fn run_series<E, F>(tasks: Vec<Task<E>>, on_done: F)
where
    E: Send + 'static,
    F: FnOnce(Result<(), E>) + Send + 'static,
{
    let series = Arc::new(Series {
        state: Mutex::new(SeriesState {
            tasks: tasks.into_iter(),
            on_done: Some(Box::new(on_done)),
            reported: Some(Ok(())),
            running: true,
        }),
    });
    series.pump();
}

/// A series run driven by a loop instead of nested continuations.
///
/// Whoever holds `running` owns the loop. A task reporting while the loop
/// is running only stores its result; a task reporting after the loop gave
/// up restarts it on its own stack.
struct Series<E> {
    state: Mutex<SeriesState<E>>,
}

struct SeriesState<E> {
    tasks: std::vec::IntoIter<Task<E>>,
    on_done: Option<Next<E>>,
    reported: Option<Result<(), E>>,
    running: bool,
}

enum Step<E> {
    Start(Task<E>),
    Finish(Next<E>, Result<(), E>),
    Suspend,
}

impl<E: Send + 'static> Series<E> {
    fn state(&self) -> MutexGuard<'_, SeriesState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pump(self: Arc<Self>) {
        loop {
            let step = {
                let mut state = self.state();
                match state.reported.take() {
                    None => {
                        state.running = false;
                        Step::Suspend
                    }
                    Some(Ok(())) => match state.tasks.next() {
                        Some(task) => Step::Start(task),
                        None => Self::finish(&mut state, Ok(())),
                    },
                    Some(Err(err)) => Self::finish(&mut state, Err(err)),
                }
            };
            match step {
                Step::Start(task) => {
                    let series = self.clone();
                    task(Box::new(move |result| series.report(result)));
                }
                Step::Finish(on_done, result) => return on_done(result),
                Step::Suspend => return,
            }
        }
    }

    fn finish(state: &mut SeriesState<E>, result: Result<(), E>) -> Step<E> {
        state.running = false;
        state.tasks = Vec::new().into_iter();
        match state.on_done.take() {
            Some(on_done) => Step::Finish(on_done, result),
            None => Step::Suspend,
        }
    }

    fn report(self: Arc<Self>, result: Result<(), E>) {
        let restart = {
            let mut state = self.state();
            state.reported = Some(result);
            !std::mem::replace(&mut state.running, true)
        };
        if restart {
            self.pump();
        }
    }
}

/// Starts every task immediately and reports once all of them reported.
///
/// The first error reported wins; later errors are dropped. `on_done` is
/// called exactly once, immediately when `tasks` is empty.
pub fn run_parallel<E, F>(tasks: Vec<Task<E>>, on_done: F)
where
    E: Send + 'static,
    F: FnOnce(Result<(), E>) + Send + 'static,
{
    if tasks.is_empty() {
        on_done(Ok(()));
        return;
    }

    let join = Arc::new(Join {
        remaining: AtomicUsize::new(tasks.len()),
        first_error: Mutex::new(None),
        on_done: Mutex::new(Some(Box::new(on_done))),
    });

    for task in tasks {
        let join = join.clone();
        task(Box::new(move |result| join.arrive(result)));
    }
}

struct Join<E> {
    remaining: AtomicUsize,
    first_error: Mutex<Option<E>>,
    on_done: Mutex<Option<Next<E>>>,
}

impl<E> Join<E> {
    fn arrive(&self, result: Result<(), E>) {
        if let Err(err) = result {
            let mut first = self.first_error.lock().unwrap_or_else(PoisonError::into_inner);
            if first.is_none() {
                *first = Some(err);
            }
        }

        if self.remaining.fetch_sub(1, Ordering::AcqRel) != 1 {
            return;
        }

        let error = self
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let on_done = self
            .on_done
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(on_done) = on_done {
            on_done(error.map_or(Ok(()), Err));
        }
    }
}
