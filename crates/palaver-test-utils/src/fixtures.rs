// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for canonical messages and contexts.

use palaver_core::types::{
    Context, ContextKind, Message, MessageId, MessageKind, SessionId,
};

/// A private-chat message from `user_id` with the given text.
pub fn private_text(user_id: &str, content: &str) -> Message {
    Message {
        msg_id: MessageId(format!("msg-{user_id}")),
        kind: MessageKind::Text,
        content: content.to_string(),
        from_user_id: user_id.to_string(),
        from_user_nickname: Some(format!("nick-{user_id}")),
        to_user_id: "bot-id".to_string(),
        other_user_id: user_id.to_string(),
        other_user_nickname: Some(format!("nick-{user_id}")),
        actual_user_id: None,
        actual_user_nickname: None,
        self_display_name: None,
        is_group: false,
        is_at: false,
        at_list: Vec::new(),
        create_time: 1_756_000_000,
    }
}

/// A group-chat message from `user_id` in the group named `group_name`.
pub fn group_text(group_id: &str, group_name: &str, user_id: &str, content: &str) -> Message {
    Message {
        msg_id: MessageId(format!("msg-{group_id}-{user_id}")),
        kind: MessageKind::Text,
        content: content.to_string(),
        from_user_id: group_id.to_string(),
        from_user_nickname: None,
        to_user_id: "bot-id".to_string(),
        other_user_id: group_id.to_string(),
        other_user_nickname: Some(group_name.to_string()),
        actual_user_id: Some(user_id.to_string()),
        actual_user_nickname: Some(format!("nick-{user_id}")),
        self_display_name: Some("Bot".to_string()),
        is_group: true,
        is_at: false,
        at_list: Vec::new(),
        create_time: 1_756_000_000,
    }
}

/// A bare private-chat context, bypassing the composer.
pub fn private_context(session: &str, content: &str) -> Context {
    Context {
        kind: ContextKind::Text,
        content: content.to_string(),
        session_id: SessionId(session.to_string()),
        receiver: session.to_string(),
        is_group: false,
        shared_session_group: false,
        origin_kind: ContextKind::Text,
        desire_reply: None,
        group_name: None,
        message: private_text(session, content),
    }
}

/// A bare group-chat context, bypassing the composer.
pub fn group_context(group_id: &str, user_id: &str, content: &str) -> Context {
    let message = group_text(group_id, &format!("name-{group_id}"), user_id, content);
    Context {
        kind: ContextKind::Text,
        content: content.to_string(),
        session_id: SessionId(format!("{user_id}@@{group_id}")),
        receiver: group_id.to_string(),
        is_group: true,
        shared_session_group: false,
        origin_kind: ContextKind::Text,
        desire_reply: None,
        group_name: Some(format!("name-{group_id}")),
        message,
    }
}
