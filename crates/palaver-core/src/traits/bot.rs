// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM bot trait: the conversation backend behind the worker pipeline.

use async_trait::async_trait;

use crate::error::PalaverError;
use crate::types::{Context, Reply, SessionId};

/// A language-model conversation backend.
///
/// One logical conversation is keyed by the context's session id; the bot
/// owns whatever per-session memory it keeps.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Produces a reply for a TEXT or IMAGE_CREATE context.
    async fn reply(&self, content: &str, context: &Context) -> Result<Reply, PalaverError>;

    /// Transcribes a voice recording into a TEXT reply.
    async fn voice_to_text(&self, _path: &str) -> Result<Reply, PalaverError> {
        Err(PalaverError::NotSupported("voice_to_text".into()))
    }

    /// Synthesizes text into a VOICE reply carrying a local file path.
    async fn text_to_voice(&self, _text: &str) -> Result<Reply, PalaverError> {
        Err(PalaverError::NotSupported("text_to_voice".into()))
    }

    /// Discards conversation memory for one session.
    async fn reset(&self, _session_id: &SessionId) -> Result<(), PalaverError> {
        Ok(())
    }

    /// Discards conversation memory for all sessions.
    async fn reset_all(&self) -> Result<(), PalaverError> {
        Ok(())
    }
}
