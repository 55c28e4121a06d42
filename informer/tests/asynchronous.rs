mod common;

use common::{Order, deferred, order_of};
use informer::prelude::*;
use informer::testing::CountingListener;
use std::time::Duration;

#[tokio::test]
async fn emit_async_without_listeners_resolves_immediately() {
    let informer = Informer::new();
    assert!(!informer.emit_async("nobody", ()).await.unwrap());
}

#[tokio::test]
async fn emit_async_resolves_after_parallel_tasks() {
    let informer = Informer::new();
    for delay in [30u64, 10, 20] {
        informer.on(
            "fetch",
            from_fn(move |ctx, _| {
                let done = ctx.wait(WaitMode::Parallel);
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    let _ = done.done();
                });
                Ok(())
            }),
        );
    }
    let counter = CountingListener::new();
    informer.on("fetch", counter.clone());

    let stopped = informer.emit_async("fetch", ()).await.unwrap();
    assert!(!stopped);
    assert_eq!(counter.count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn series_completion_from_another_task() {
    let informer = Informer::new();
    let order = Order::default();
    let (slow, completions) = deferred(WaitMode::Series, &order, "slow");
    informer.on("job", slow);
    let log = order.clone();
    informer.on(
        "job",
        from_fn(move |_, _| {
            log.lock().unwrap().push("next");
            Ok(())
        }),
    );

    let pending = informer.emit_async("job", ());
    let completion = completions.recv().unwrap();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        completion.done().unwrap();
    });

    assert!(!pending.await.unwrap());
    assert_eq!(order_of(&order), vec!["slow", "next"]);
}

#[tokio::test]
async fn emit_async_reports_listener_failures() {
    let informer = Informer::new();
    informer.on(
        "job",
        named(
            "worker",
            from_fn(|ctx, _| {
                let done = ctx.wait(WaitMode::Series);
                tokio::spawn(async move {
                    let _ = done.fail("timed out");
                });
                Ok(())
            }),
        ),
    );

    let err = informer.emit_async("job", ()).await.unwrap_err();
    assert_eq!(err.to_string(), "listener `worker` failed: timed out");
}

#[tokio::test]
async fn emit_async_reports_stop() {
    let informer = Informer::new();
    informer.on(
        "job",
        from_fn(|ctx, _| {
            ctx.stop();
            Ok(())
        }),
    );
    assert!(informer.emit_async("job", ()).await.unwrap());
}

#[tokio::test]
async fn dropped_completions_abandon_the_emission() {
    let informer = Informer::new();
    informer.on(
        "job",
        from_fn(|ctx, _| {
            drop(ctx.wait(WaitMode::Series));
            Ok(())
        }),
    );

    let err = informer.emit_async("job", ()).await.unwrap_err();
    assert!(matches!(err, EmitError::Abandoned));
}

#[tokio::test]
async fn unheard_error_events_fail_the_future() {
    let informer = Informer::new();
    let err = informer
        .emit_async("error", (Value::error("exploded"),))
        .await
        .unwrap_err();
    assert!(err.is_unhandled());
    assert_eq!(err.to_string(), "exploded");
}
