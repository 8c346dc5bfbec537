// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM bot for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use palaver_core::error::PalaverError;
use palaver_core::traits::Bot;
use palaver_core::types::{Context, Reply, ReplyKind, SessionId};

/// A mock bot that returns pre-configured replies.
///
/// Replies are popped from a FIFO queue; when the queue is empty, a default
/// "mock reply" text is returned. Every `reply()` invocation and every reset
/// is recorded for assertion.
pub struct MockBot {
    responses: Arc<Mutex<VecDeque<Reply>>>,
    transcript: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
    resets: Arc<Mutex<Vec<Option<SessionId>>>>,
}

impl MockBot {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            transcript: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(Vec::new())),
            resets: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock bot pre-loaded with text replies.
    pub fn with_responses(texts: Vec<&str>) -> Self {
        let bot = Self::new();
        let mut queue = VecDeque::new();
        for text in texts {
            queue.push_back(Reply::text(text));
        }
        *bot.responses.try_lock().expect("fresh mutex") = queue;
        bot
    }

    /// Add a reply to the end of the queue.
    pub async fn add_response(&self, reply: Reply) {
        self.responses.lock().await.push_back(reply);
    }

    /// Fix the transcription returned by `voice_to_text`.
    pub async fn set_transcript(&self, text: &str) {
        *self.transcript.lock().await = Some(text.to_string());
    }

    /// Contents passed to `reply()`, in call order.
    pub async fn reply_calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    /// Session resets observed; `None` marks a reset-all.
    pub async fn resets(&self) -> Vec<Option<SessionId>> {
        self.resets.lock().await.clone()
    }
}

impl Default for MockBot {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn reply(&self, content: &str, _context: &Context) -> Result<Reply, PalaverError> {
        self.calls.lock().await.push(content.to_string());
        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Reply::text("mock reply")))
    }

    async fn voice_to_text(&self, _path: &str) -> Result<Reply, PalaverError> {
        match self.transcript.lock().await.clone() {
            Some(text) => Ok(Reply::new(ReplyKind::Text, text)),
            None => Err(PalaverError::NotSupported("voice_to_text".into())),
        }
    }

    async fn reset(&self, session_id: &SessionId) -> Result<(), PalaverError> {
        self.resets.lock().await.push(Some(session_id.clone()));
        Ok(())
    }

    async fn reset_all(&self) -> Result<(), PalaverError> {
        self.resets.lock().await.push(None);
        Ok(())
    }
}
