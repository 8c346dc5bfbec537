// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dev loopback adapters: stdin lines in, stdout replies out.
//!
//! Stands in for a real messaging backend so the gateway can be exercised
//! locally without any external service.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use palaver_core::error::PalaverError;
use palaver_core::traits::{Bot, ChannelBackend, GroupMemberCache, MessageNormalizer};
use palaver_core::types::{
    Context, Message, MessageId, MessageKind, Reply, SessionId,
};

/// The local user id every stdin line is attributed to.
pub const LOOPBACK_USER: &str = "local";

/// Prints replies to stdout.
pub struct LoopbackBackend;

#[async_trait]
impl ChannelBackend for LoopbackBackend {
    fn name(&self) -> &str {
        "loopback"
    }

    fn no_need_prefix(&self) -> bool {
        // Every stdin line is addressed to the bot.
        true
    }

    async fn send(&self, reply: &Reply, context: &Context) -> Result<(), PalaverError> {
        println!("[{} -> {}] {}", reply.kind, context.receiver, reply.content);
        Ok(())
    }
}

/// Echoes the handled content back. Stands in for an LLM backend.
pub struct EchoBot;

#[async_trait]
impl Bot for EchoBot {
    async fn reply(&self, content: &str, _context: &Context) -> Result<Reply, PalaverError> {
        Ok(Reply::text(format!("echo: {content}")))
    }

    async fn reset(&self, session_id: &SessionId) -> Result<(), PalaverError> {
        info!(%session_id, "loopback conversation reset");
        Ok(())
    }
}

/// Turns one stdin line into a private-chat text message.
pub struct LineNormalizer;

impl MessageNormalizer for LineNormalizer {
    type Raw = String;

    fn normalize(&self, raw: String) -> Result<Message, PalaverError> {
        Ok(Message {
            msg_id: MessageId(Uuid::new_v4().to_string()),
            kind: MessageKind::Text,
            content: raw,
            from_user_id: LOOPBACK_USER.to_string(),
            from_user_nickname: Some(LOOPBACK_USER.to_string()),
            to_user_id: "palaver".to_string(),
            other_user_id: LOOPBACK_USER.to_string(),
            other_user_nickname: Some(LOOPBACK_USER.to_string()),
            actual_user_id: None,
            actual_user_nickname: None,
            self_display_name: None,
            is_group: false,
            is_at: false,
            at_list: Vec::new(),
            create_time: chrono::Utc::now().timestamp(),
        })
    }
}

/// The loopback world has no groups.
pub struct NoMembers;

#[async_trait]
impl GroupMemberCache for NoMembers {
    async fn display_name(&self, _group_id: &str, _user_id: &str) -> Option<String> {
        None
    }
}
