// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session-keyed producer/consumer scheduler.
//!
//! Each session owns a double-ended queue of contexts and a bounded
//! concurrency semaphore. A single background consume loop polls all
//! sessions at a fixed interval and submits work to a global worker pool,
//! so at most `concurrency_in_session` pipeline invocations run per session
//! and at most `worker_pool_size` run overall.
//!
//! Polling was chosen over per-session wakeups deliberately: it cannot lose
//! a wakeup when `produce` races the loop's queue-empty check, at the cost
//! of up to one poll interval of latency.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use palaver_config::DispatchConfig;
use palaver_core::error::PalaverError;
use palaver_core::traits::SessionControl;
use palaver_core::types::{Context, ContextKind, SessionId};

/// Executes one context end to end, off the scheduler task.
///
/// Errors are logged at the completion boundary and treated as task-complete;
/// they never reach the consume loop.
#[async_trait]
pub trait ContextHandler: Send + Sync {
    async fn handle(&self, context: Context) -> Result<(), PalaverError>;
}

struct SessionEntry {
    queue: VecDeque<Context>,
    concurrency: Arc<Semaphore>,
    limit: usize,
    /// Workers submitted and not yet completed. Decremented strictly before
    /// the worker's concurrency permit is released, so a fully-available
    /// semaphore implies a zero count.
    in_flight: Arc<AtomicUsize>,
    cancel: CancellationToken,
}

impl SessionEntry {
    fn new(limit: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            concurrency: Arc::new(Semaphore::new(limit)),
            limit,
            in_flight: Arc::new(AtomicUsize::new(0)),
            cancel: CancellationToken::new(),
        }
    }

    /// Discards queued contexts and cancels not-yet-started workers.
    /// In-flight work runs to completion.
    fn cancel(&mut self, session_id: &SessionId) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        let discarded = self.queue.len();
        self.queue = VecDeque::new();
        if discarded > 0 {
            info!(%session_id, discarded, "cancelled queued contexts");
        }
    }
}

struct Inner {
    sessions: Mutex<HashMap<SessionId, SessionEntry>>,
    pool: Arc<Semaphore>,
    config: DispatchConfig,
    shutdown: CancellationToken,
}

/// The dispatcher: owns the session queue table and the consume loop.
///
/// Cheap to clone; all clones share one queue table. Constructed once at
/// process start and handed to producers by clone, never through globals.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                sessions: Mutex::new(HashMap::new()),
                pool: Arc::new(Semaphore::new(config.worker_pool_size)),
                config,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Enqueues a context for its session, creating the session entry on
    /// first use. Admin-command contexts (sigil-prefixed text) jump to the
    /// front of the queue; this is the sole priority mechanism.
    pub fn produce(&self, context: Context) {
        let session_id = context.session_id.clone();
        let mut sessions = lock(&self.inner);
        let entry = sessions
            .entry(session_id.clone())
            .or_insert_with(|| SessionEntry::new(self.inner.config.concurrency_in_session));
        if context.kind == ContextKind::Text
            && context.content.starts_with(&self.inner.config.admin_sigil)
        {
            debug!(%session_id, "admin command enqueued with priority");
            entry.queue.push_front(context);
        } else {
            entry.queue.push_back(context);
        }
    }

    /// Spawns the background consume loop. Call once; returns the loop's
    /// join handle. The loop runs until [`Dispatcher::shutdown`].
    pub fn startup(&self, handler: Arc<dyn ContextHandler>) -> JoinHandle<()> {
        let inner = self.inner.clone();
        info!(
            concurrency_in_session = inner.config.concurrency_in_session,
            worker_pool_size = inner.config.worker_pool_size,
            poll_interval_ms = inner.config.poll_interval_ms,
            "dispatcher started"
        );
        tokio::spawn(async move {
            let mut tick =
                tokio::time::interval(Duration::from_millis(inner.config.poll_interval_ms));
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = tick.tick() => consume_tick(&inner, &handler),
                    _ = inner.shutdown.cancelled() => {
                        debug!("dispatcher consume loop stopped");
                        return;
                    }
                }
            }
        })
    }

    /// Stops the consume loop. In-flight workers finish on their own.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
    }

    /// Number of live session entries. Entries are reclaimed once their
    /// queue is drained and every in-flight worker has finished.
    pub fn session_count(&self) -> usize {
        lock(&self.inner).len()
    }

    /// Queued (not yet submitted) contexts for one session.
    pub fn queued_len(&self, session_id: &SessionId) -> usize {
        lock(&self.inner)
            .get(session_id)
            .map_or(0, |e| e.queue.len())
    }
}

impl SessionControl for Dispatcher {
    fn cancel_session(&self, session_id: &SessionId) {
        let mut sessions = lock(&self.inner);
        if let Some(entry) = sessions.get_mut(session_id) {
            entry.cancel(session_id);
        }
    }

    fn cancel_all_sessions(&self) {
        let mut sessions = lock(&self.inner);
        for (session_id, entry) in sessions.iter_mut() {
            entry.cancel(session_id);
        }
    }
}

/// One pass over a snapshot of the session table.
fn consume_tick(inner: &Arc<Inner>, handler: &Arc<dyn ContextHandler>) {
    let session_ids: Vec<SessionId> = lock(inner).keys().cloned().collect();

    for session_id in session_ids {
        let submission = {
            let mut sessions = lock(inner);
            let Some(entry) = sessions.get_mut(&session_id) else {
                continue;
            };

            // Non-blocking acquire: a session at its concurrency limit is
            // simply skipped this tick and revisited on the next.
            let Ok(permit) = entry.concurrency.clone().try_acquire_owned() else {
                continue;
            };

            if let Some(context) = entry.queue.pop_front() {
                entry.in_flight.fetch_add(1, Ordering::SeqCst);
                Some((context, permit, entry.in_flight.clone(), entry.cancel.clone()))
            } else {
                // Queue empty and we hold one unit. If every other unit is
                // also free, nothing is queued or in flight: reclaim.
                if entry.concurrency.available_permits() + 1 == entry.limit {
                    assert_eq!(
                        entry.in_flight.load(Ordering::SeqCst),
                        0,
                        "scheduler invariant violated: session {session_id} reclaimed with workers in flight"
                    );
                    drop(permit);
                    sessions.remove(&session_id);
                    debug!(%session_id, "session entry reclaimed");
                } else {
                    drop(permit);
                }
                None
            }
        };

        if let Some((context, permit, in_flight, cancel)) = submission {
            spawn_worker(
                handler.clone(),
                inner.pool.clone(),
                context,
                session_id,
                permit,
                in_flight,
                cancel,
            );
        }
    }
}

/// Decrements the in-flight count when the worker ends, normally or by
/// panic. Declared after the session permit inside the worker so it drops
/// first: the count reaches zero strictly before the concurrency unit frees
/// up, which makes the reclamation assert sound.
struct FlightGuard(Arc<AtomicUsize>);

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Submits one context to the worker pool.
///
/// The task holds its session's concurrency unit for its whole life, but
/// only becomes in-flight (uncancellable) once it acquires a global pool
/// permit. Cancellation before that point discards the context quietly,
/// mirroring the cancellation of a queued-but-unstarted thread-pool job.
fn spawn_worker(
    handler: Arc<dyn ContextHandler>,
    pool: Arc<Semaphore>,
    context: Context,
    session_id: SessionId,
    session_permit: OwnedSemaphorePermit,
    in_flight: Arc<AtomicUsize>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        let _session_permit = session_permit;
        let _flight = FlightGuard(in_flight);
        let _pool_permit = tokio::select! {
            _ = cancel.cancelled() => {
                info!(%session_id, "worker cancelled before start");
                return;
            }
            permit = pool.acquire_owned() => match permit {
                Ok(p) => p,
                Err(_) => return, // pool closed: shutting down
            },
        };

        debug!(%session_id, "worker consuming context");
        match handler.handle(context).await {
            Ok(()) => debug!(%session_id, "worker finished"),
            Err(e) => warn!(%session_id, error = %e, "worker finished with error"),
        }
    });
}

fn lock(inner: &Arc<Inner>) -> std::sync::MutexGuard<'_, HashMap<SessionId, SessionEntry>> {
    // Lock poisoning means a panic inside a critical section that only does
    // queue and counter bookkeeping; the map itself stays consistent.
    match inner.sessions.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
