#![allow(dead_code)]

use informer::{Completion, Context, EmitError, Listener, Value, WaitMode, from_fn};
use std::sync::{Arc, Mutex, mpsc};

// ============================================================================
// Order recording
// ============================================================================

pub type Order = Arc<Mutex<Vec<&'static str>>>;

/// A listener pushing `id` to `order` on every call.
pub fn step(order: &Order, id: &'static str) -> impl Listener {
    let order = order.clone();
    from_fn(move |_, _| {
        order.lock().unwrap().push(id);
        Ok(())
    })
}

pub fn order_of(order: &Order) -> Vec<&'static str> {
    order.lock().unwrap().clone()
}

// ============================================================================
// Emission callbacks
// ============================================================================

/// Every `(error, stopped)` pair a callback received, errors rendered.
pub type Outcomes = Arc<Mutex<Vec<(Option<String>, bool)>>>;

pub fn outcomes() -> (Outcomes, impl FnOnce(Option<EmitError>, bool) + Send + 'static) {
    let outcomes = Outcomes::default();
    let writer = outcomes.clone();
    let callback = move |error: Option<EmitError>, stopped: bool| {
        writer
            .lock()
            .unwrap()
            .push((error.map(|e| e.to_string()), stopped));
    };
    (outcomes, callback)
}

pub fn outcomes_of(outcomes: &Outcomes) -> Vec<(Option<String>, bool)> {
    outcomes.lock().unwrap().clone()
}

// ============================================================================
// Deferred listeners
// ============================================================================

/// A listener that waits in `mode` and hands its completion to the test.
pub fn deferred(
    mode: WaitMode,
    order: &Order,
    id: &'static str,
) -> (impl Listener, mpsc::Receiver<Completion>) {
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    let order = order.clone();
    let listener = from_fn(move |ctx: &Context, _: &[Value]| {
        order.lock().unwrap().push(id);
        tx.lock().unwrap().send(ctx.wait(mode)).unwrap();
        Ok(())
    });
    (listener, rx)
}
