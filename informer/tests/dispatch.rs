mod common;

use common::{Order, deferred, order_of, outcomes, outcomes_of, step};
use informer::prelude::*;
use informer::testing::CountingListener;

#[test]
fn emit_without_listeners_skips_the_callback() {
    let informer = Informer::new();
    let (seen, callback) = outcomes();
    let status = informer.emit_with("nobody", (1,), callback).unwrap();
    assert_eq!(status, EmitStatus::NoListeners);
    assert!(outcomes_of(&seen).is_empty());
}

#[test]
fn synchronous_emission_reports_to_the_callback() {
    let informer = Informer::new();
    informer.on("t", CountingListener::new());
    let (seen, callback) = outcomes();

    let status = informer.emit_with("t", (), callback).unwrap();
    assert_eq!(
        status,
        EmitStatus::Completed {
            stopped: false,
            asynchronous: false
        }
    );
    assert_eq!(outcomes_of(&seen), vec![(None, false)]);
}

#[test]
fn synchronous_failures_go_to_the_callback_when_present() {
    let informer = Informer::new();
    informer.on("t", named("broken", CountingListener::failing("boom")));
    let (seen, callback) = outcomes();

    assert!(informer.emit_with("t", (), callback).is_ok());
    assert_eq!(
        outcomes_of(&seen),
        vec![(Some("listener `broken` failed: boom".to_string()), false)]
    );
}

#[test]
fn a_failing_series_listener_ends_the_emission() {
    let informer = Informer::new();
    let after = CountingListener::new();
    informer.on("t", CountingListener::failing("boom"));
    informer.on("t", after.clone());

    assert!(informer.emit("t", ()).is_err());
    assert_eq!(after.count(), 0);
}

#[test]
fn stop_prevents_later_listeners() {
    let informer = Informer::new();
    let order = Order::default();
    informer.on("t", step(&order, "before"));
    let log = order.clone();
    informer.on(
        "t",
        from_fn(move |ctx, _| {
            log.lock().unwrap().push("stopper");
            ctx.stop();
            assert!(ctx.is_stopped());
            Ok(())
        }),
    );
    informer.on("t", step(&order, "after"));
    let (seen, callback) = outcomes();

    let status = informer.emit_with("t", (), callback).unwrap();
    assert!(status.was_stopped());
    assert_eq!(order_of(&order), vec!["before", "stopper"]);
    assert_eq!(outcomes_of(&seen), vec![(None, true)]);
}

#[test]
fn stop_leaves_started_parallel_listeners_running() {
    let informer = Informer::new();
    let order = Order::default();
    let (parallel, completions) = deferred(WaitMode::Parallel, &order, "parallel");
    informer.on("t", parallel);
    informer.on("t", from_fn(|ctx, _| {
        ctx.stop();
        Ok(())
    }));
    informer.on("t", step(&order, "skipped"));
    let (seen, callback) = outcomes();

    assert!(informer.emit_with("t", (), callback).unwrap().is_pending());
    assert!(outcomes_of(&seen).is_empty());

    completions.recv().unwrap().done().unwrap();
    assert_eq!(order_of(&order), vec!["parallel"]);
    assert_eq!(outcomes_of(&seen), vec![(None, true)]);
}

#[test]
fn immediate_series_completion_is_still_asynchronous() {
    let informer = Informer::new();
    informer.on(
        "t",
        from_fn(|ctx, _| {
            ctx.wait(WaitMode::Series).done()?;
            Ok(())
        }),
    );
    let (seen, callback) = outcomes();

    let status = informer.emit_with("t", (), callback).unwrap();
    assert_eq!(
        status,
        EmitStatus::Completed {
            stopped: false,
            asynchronous: true
        }
    );
    assert_eq!(outcomes_of(&seen), vec![(None, false)]);
}

#[test]
fn series_listeners_hold_back_the_next_one() {
    let informer = Informer::new();
    let order = Order::default();
    let (slow, completions) = deferred(WaitMode::Series, &order, "slow");
    informer.on("t", slow);
    informer.on("t", step(&order, "next"));
    let (seen, callback) = outcomes();

    assert_eq!(informer.emit_with("t", (), callback).unwrap(), EmitStatus::Pending);
    assert_eq!(order_of(&order), vec!["slow"]);

    completions.recv().unwrap().done().unwrap();
    assert_eq!(order_of(&order), vec!["slow", "next"]);
    assert_eq!(outcomes_of(&seen), vec![(None, false)]);
}

#[test]
fn parallel_listeners_join_in_any_order() {
    let informer = Informer::new();
    let order = Order::default();
    let (first, first_done) = deferred(WaitMode::Parallel, &order, "one");
    let (second, second_done) = deferred(WaitMode::Parallel, &order, "two");
    informer.on("t", first);
    informer.on("t", second);
    informer.on("t", step(&order, "three"));
    let (seen, callback) = outcomes();

    assert!(informer.emit_with("t", (), callback).unwrap().is_pending());
    assert_eq!(order_of(&order), vec!["one", "two", "three"]);

    second_done.recv().unwrap().done().unwrap();
    assert!(outcomes_of(&seen).is_empty());

    first_done.recv().unwrap().done().unwrap();
    assert_eq!(outcomes_of(&seen), vec![(None, false)]);
}

#[test]
fn completions_fire_once() {
    let informer = Informer::new();
    let order = Order::default();
    let (slow, completions) = deferred(WaitMode::Series, &order, "slow");
    informer.on("t", slow);
    informer.on("t", step(&order, "next"));
    let (seen, callback) = outcomes();
    informer.emit_with("t", (), callback).unwrap();

    let completion = completions.recv().unwrap();
    let copy = completion.clone();
    completion.done().unwrap();
    copy.fail("late").unwrap();
    assert!(copy.is_done());
    assert_eq!(order_of(&order), vec!["slow", "next"]);
    assert_eq!(outcomes_of(&seen), vec![(None, false)]);
}

#[test]
fn series_and_parallel_failures_are_combined() {
    let informer = Informer::new();
    let order = Order::default();
    let (parallel, parallel_done) = deferred(WaitMode::Parallel, &order, "parallel");
    informer.on("t", named("side", parallel));
    informer.on("t", named("main", CountingListener::failing("main broke")));
    let (seen, callback) = outcomes();

    informer.emit_with("t", (), callback).unwrap();
    assert!(outcomes_of(&seen).is_empty());

    parallel_done.recv().unwrap().fail("side broke").unwrap();
    assert_eq!(
        outcomes_of(&seen),
        vec![(
            Some("listener `main` failed: main broke; listener `side` failed: side broke".to_string()),
            false
        )]
    );
}

#[test]
fn detached_faults_surface_from_the_final_completion() {
    let informer = Informer::new();
    let order = Order::default();
    let (slow, completions) = deferred(WaitMode::Series, &order, "slow");
    informer.on("t", named("slow", slow));

    assert_eq!(informer.emit("t", ()).unwrap(), EmitStatus::Pending);
    let err = completions.recv().unwrap().fail("gave up").unwrap_err();
    assert_eq!(err.to_string(), "listener `slow` failed: gave up");
}

#[test]
fn wait_after_returning_is_inert() {
    let informer = Informer::new();
    let stash = std::sync::Arc::new(std::sync::Mutex::new(None));
    let keep = stash.clone();
    informer.on(
        "t",
        from_fn(move |ctx, _| {
            *keep.lock().unwrap() = Some(ctx.clone());
            Ok(())
        }),
    );
    let (seen, callback) = outcomes();
    informer.emit_with("t", (), callback).unwrap();
    assert_eq!(outcomes_of(&seen), vec![(None, false)]);

    let ctx = stash.lock().unwrap().take().unwrap();
    let late = ctx.wait(WaitMode::Series);
    assert!(late.is_done());
    late.fail("too late").unwrap();
    assert_eq!(outcomes_of(&seen), vec![(None, false)]);
}

#[test]
fn many_synchronous_listeners_do_not_deepen_the_stack() {
    let informer = Informer::new();
    let counter = CountingListener::new();
    for _ in 0..50_000 {
        informer.on("t", counter.clone());
    }

    let status = informer.emit("t", ()).unwrap();
    assert_eq!(
        status,
        EmitStatus::Completed {
            stopped: false,
            asynchronous: false
        }
    );
    assert_eq!(counter.count(), 50_000);
}

#[test]
fn resuming_a_series_listener_runs_a_long_tail() {
    let informer = Informer::new();
    let order = Order::default();
    let (slow, completions) = deferred(WaitMode::Series, &order, "slow");
    informer.on("t", slow);
    let counter = CountingListener::new();
    for _ in 0..50_000 {
        informer.on("t", counter.clone());
    }
    let (seen, callback) = outcomes();

    assert!(informer.emit_with("t", (), callback).unwrap().is_pending());
    assert_eq!(counter.count(), 0);

    completions.recv().unwrap().done().unwrap();
    assert_eq!(counter.count(), 50_000);
    assert_eq!(outcomes_of(&seen), vec![(None, false)]);
}

#[test]
fn only_the_final_report_returns_the_fault() {
    let informer = Informer::new();
    let order = Order::default();
    let (first, first_done) = deferred(WaitMode::Parallel, &order, "first");
    let (second, second_done) = deferred(WaitMode::Parallel, &order, "second");
    informer.on("t", named("first", first));
    informer.on("t", named("second", second));

    assert!(informer.emit("t", ()).unwrap().is_pending());

    let first = first_done.recv().unwrap();
    let early = std::thread::spawn(move || first.fail("first broke"))
        .join()
        .unwrap();
    assert!(early.is_ok());

    let err = second_done.recv().unwrap().done().unwrap_err();
    assert_eq!(err.to_string(), "listener `first` failed: first broke");
}
