// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatcher scheduling tests: per-session concurrency bounds, admin
//! priority, entry reclamation, and cancellation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing_test::traced_test;

use palaver_channel::{ContextHandler, Dispatcher};
use palaver_config::DispatchConfig;
use palaver_core::error::PalaverError;
use palaver_core::traits::SessionControl;
use palaver_core::types::{Context, SessionId};
use palaver_test_utils::fixtures;

fn config(concurrency: usize, pool: usize) -> DispatchConfig {
    DispatchConfig {
        concurrency_in_session: concurrency,
        worker_pool_size: pool,
        poll_interval_ms: 10,
        admin_sigil: "#".to_string(),
    }
}

/// Records handled contents, tracks concurrent invocations, and holds each
/// invocation for `hold` before returning.
struct RecordingHandler {
    handled: Mutex<Vec<String>>,
    current: AtomicUsize,
    peak: AtomicUsize,
    hold: Duration,
}

impl RecordingHandler {
    fn new(hold: Duration) -> Self {
        Self {
            handled: Mutex::new(Vec::new()),
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            hold,
        }
    }

    async fn handled(&self) -> Vec<String> {
        self.handled.lock().await.clone()
    }
}

#[async_trait]
impl ContextHandler for RecordingHandler {
    async fn handle(&self, context: Context) -> Result<(), PalaverError> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.hold).await;
        self.handled.lock().await.push(context.content);
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

async fn wait_until(mut done: impl FnMut() -> bool) {
    for _ in 0..300 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within 3s");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn per_session_concurrency_never_exceeds_limit() {
    let dispatcher = Dispatcher::new(config(2, 8));
    let handler = Arc::new(RecordingHandler::new(Duration::from_millis(40)));
    let loop_handle = dispatcher.startup(handler.clone());

    for i in 0..10 {
        dispatcher.produce(fixtures::private_context("u1", &format!("msg-{i}")));
    }

    let h = handler.clone();
    wait_until(move || h.handled.try_lock().map(|v| v.len() == 10).unwrap_or(false)).await;
    assert!(handler.peak.load(Ordering::SeqCst) <= 2);

    dispatcher.shutdown();
    let _ = loop_handle.await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn admin_command_dequeues_before_queued_normals() {
    let dispatcher = Dispatcher::new(config(1, 8));
    let handler = Arc::new(RecordingHandler::new(Duration::from_millis(5)));

    for i in 0..3 {
        dispatcher.produce(fixtures::private_context("u1", &format!("normal-{i}")));
    }
    dispatcher.produce(fixtures::private_context("u1", "#stop"));

    let loop_handle = dispatcher.startup(handler.clone());
    let h = handler.clone();
    wait_until(move || h.handled.try_lock().map(|v| v.len() == 4).unwrap_or(false)).await;

    let order = handler.handled().await;
    assert_eq!(
        order,
        vec!["#stop", "normal-0", "normal-1", "normal-2"],
        "admin command must run before every already-queued normal context"
    );

    dispatcher.shutdown();
    let _ = loop_handle.await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn idle_session_entry_is_reclaimed() {
    let dispatcher = Dispatcher::new(config(4, 8));
    let handler = Arc::new(RecordingHandler::new(Duration::from_millis(5)));
    let loop_handle = dispatcher.startup(handler.clone());

    dispatcher.produce(fixtures::private_context("u1", "hello"));
    let d = dispatcher.clone();
    wait_until(move || d.session_count() == 0).await;

    let handled = handler.handled().await;
    assert_eq!(handled, vec!["hello"]);

    dispatcher.shutdown();
    let _ = loop_handle.await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sessions_are_isolated_but_share_the_pool() {
    let dispatcher = Dispatcher::new(config(1, 8));
    let handler = Arc::new(RecordingHandler::new(Duration::from_millis(30)));
    let loop_handle = dispatcher.startup(handler.clone());

    for user in ["u1", "u2", "u3"] {
        dispatcher.produce(fixtures::private_context(user, &format!("from-{user}")));
    }

    let h = handler.clone();
    wait_until(move || h.handled.try_lock().map(|v| v.len() == 3).unwrap_or(false)).await;
    // Three one-per-session contexts overlap in the shared pool.
    assert!(handler.peak.load(Ordering::SeqCst) >= 2);

    dispatcher.shutdown();
    let _ = loop_handle.await;
}

#[traced_test]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancel_discards_queued_contexts() {
    let dispatcher = Dispatcher::new(config(1, 8));
    let handler = Arc::new(RecordingHandler::new(Duration::from_millis(300)));
    let loop_handle = dispatcher.startup(handler.clone());

    for i in 0..3 {
        dispatcher.produce(fixtures::private_context("u1", &format!("msg-{i}")));
    }

    // Wait for the first context to be in flight, then cancel the session.
    let h = handler.clone();
    wait_until(move || h.current.load(Ordering::SeqCst) == 1).await;
    let session = SessionId("u1".into());
    dispatcher.cancel_session(&session);
    assert_eq!(dispatcher.queued_len(&session), 0);

    tokio::time::sleep(Duration::from_millis(600)).await;
    let handled = handler.handled().await;
    assert_eq!(handled, vec!["msg-0"], "in-flight work completes, queued work is discarded");
    assert!(logs_contain("cancelled queued contexts"));

    dispatcher.shutdown();
    let _ = loop_handle.await;
}

#[tokio::test]
async fn cancel_unknown_session_is_a_noop() {
    let dispatcher = Dispatcher::new(config(4, 8));
    dispatcher.cancel_session(&SessionId("nobody".into()));
    dispatcher.cancel_all_sessions();
    assert_eq!(dispatcher.session_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn session_accepts_new_work_after_cancellation() {
    let dispatcher = Dispatcher::new(config(1, 8));
    let handler = Arc::new(RecordingHandler::new(Duration::from_millis(5)));
    let loop_handle = dispatcher.startup(handler.clone());

    dispatcher.produce(fixtures::private_context("u1", "before"));
    let h = handler.clone();
    wait_until(move || h.handled.try_lock().map(|v| v.len() == 1).unwrap_or(false)).await;

    dispatcher.cancel_session(&SessionId("u1".into()));
    dispatcher.produce(fixtures::private_context("u1", "after"));

    let h = handler.clone();
    wait_until(move || h.handled.try_lock().map(|v| v.len() == 2).unwrap_or(false)).await;
    assert_eq!(handler.handled().await, vec!["before", "after"]);

    dispatcher.shutdown();
    let _ = loop_handle.await;
}

/// A handler that panics must still release its concurrency slot so the
/// session keeps draining.
struct PanickingOnce {
    panicked: AtomicUsize,
    inner: RecordingHandler,
}

#[async_trait]
impl ContextHandler for PanickingOnce {
    async fn handle(&self, context: Context) -> Result<(), PalaverError> {
        if context.content == "boom" && self.panicked.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("handler blew up");
        }
        self.inner.handle(context).await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn worker_panic_does_not_wedge_the_session() {
    let dispatcher = Dispatcher::new(config(1, 8));
    let handler = Arc::new(PanickingOnce {
        panicked: AtomicUsize::new(0),
        inner: RecordingHandler::new(Duration::from_millis(5)),
    });
    let loop_handle = dispatcher.startup(handler.clone());

    dispatcher.produce(fixtures::private_context("u1", "boom"));
    dispatcher.produce(fixtures::private_context("u1", "still alive"));

    let h = handler.clone();
    wait_until(move || {
        h.inner
            .handled
            .try_lock()
            .map(|v| v.contains(&"still alive".to_string()))
            .unwrap_or(false)
    })
    .await;

    dispatcher.shutdown();
    let _ = loop_handle.await;
}
