// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording channel backend for deterministic testing.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use palaver_core::error::PalaverError;
use palaver_core::traits::ChannelBackend;
use palaver_core::types::{Context, Reply, ReplyKind, SessionId};

/// A channel backend that captures every send for assertion.
///
/// Failures are scriptable: `fail_next(n)` makes the next `n` sends return a
/// transport error, and kinds added via `reject_kind` are reported as
/// unsupported capabilities.
pub struct RecordingBackend {
    sent: Arc<Mutex<Vec<(Reply, SessionId)>>>,
    failures_left: AtomicUsize,
    unsupported: HashSet<ReplyKind>,
    not_supported_error: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failures_left: AtomicUsize::new(0),
            unsupported: HashSet::new(),
            not_supported_error: false,
        }
    }

    /// Make the next `n` sends fail with a transport error.
    pub fn fail_next(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    /// Report the given reply kind as unsupported via `supports()`.
    pub fn reject_kind(mut self, kind: ReplyKind) -> Self {
        self.unsupported.insert(kind);
        self
    }

    /// Make every send fail with a missing-capability error instead of a
    /// transport error.
    pub fn always_not_supported(mut self) -> Self {
        self.not_supported_error = true;
        self
    }

    /// Replies delivered through `send()`, with their session ids.
    pub async fn sent(&self) -> Vec<(Reply, SessionId)> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn supports(&self, kind: ReplyKind) -> bool {
        !self.unsupported.contains(&kind)
    }

    async fn send(&self, reply: &Reply, context: &Context) -> Result<(), PalaverError> {
        if self.not_supported_error {
            return Err(PalaverError::NotSupported("send".into()));
        }
        if self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(PalaverError::channel("scripted transport failure"));
        }
        self.sent
            .lock()
            .await
            .push((reply.clone(), context.session_id.clone()));
        Ok(())
    }
}
