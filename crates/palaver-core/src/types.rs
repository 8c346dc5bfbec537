// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canonical message model shared by the composer, dispatcher, and pipeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Stable key of a logical conversation. The sole key used for queue and
/// concurrency partitioning in the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Unique identifier of one inbound backend event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Classification of a normalized inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    Text,
    Image,
    Voice,
    Video,
    File,
    Sharing,
    JoinGroup,
    ExitGroup,
    Patpat,
    AcceptFriend,
    /// Platform broadcast / system notification.
    System,
    /// Public-account or other non-user sender.
    NonUser,
}

/// A canonical message record, produced once per inbound backend event by a
/// [`crate::traits::MessageNormalizer`] and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub msg_id: MessageId,
    pub kind: MessageKind,
    /// Text body, or a local path / reference for media messages.
    pub content: String,
    pub from_user_id: String,
    #[serde(default)]
    pub from_user_nickname: Option<String>,
    pub to_user_id: String,
    /// The conversation peer: group id in group chats, the other user in
    /// private chats.
    pub other_user_id: String,
    /// Display name of the peer (group name in group chats).
    #[serde(default)]
    pub other_user_nickname: Option<String>,
    /// The member who actually spoke, for group messages.
    #[serde(default)]
    pub actual_user_id: Option<String>,
    #[serde(default)]
    pub actual_user_nickname: Option<String>,
    /// The bot's own display name inside this group, if any.
    #[serde(default)]
    pub self_display_name: Option<String>,
    pub is_group: bool,
    /// Whether the bot was @-mentioned.
    #[serde(default)]
    pub is_at: bool,
    /// User ids explicitly tagged in the message, in order.
    #[serde(default)]
    pub at_list: Vec<String>,
    /// Unix timestamp of the backend event.
    pub create_time: i64,
}

impl Message {
    /// True for senders that can never trigger the bot: platform broadcasts
    /// and public-account style non-user senders.
    pub fn is_non_user(&self) -> bool {
        matches!(self.kind, MessageKind::System | MessageKind::NonUser)
    }
}

/// Routing classification of a [`Context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ContextKind {
    Text,
    /// Text reclassified as an image-generation request.
    ImageCreate,
    Voice,
    Image,
    Video,
    File,
    Sharing,
    AcceptFriend,
    JoinGroup,
    ExitGroup,
    Patpat,
    Function,
}

/// The routing envelope produced by the composer and consumed exactly once
/// by the worker pipeline. Never mutated after being handed to the
/// dispatcher; re-entrant composition derives a fresh context instead.
#[derive(Debug, Clone)]
pub struct Context {
    pub kind: ContextKind,
    pub content: String,
    pub session_id: SessionId,
    /// Where the reply goes: group id for group chats, peer id otherwise.
    pub receiver: String,
    pub is_group: bool,
    /// Whether all members of this group share one conversation.
    pub shared_session_group: bool,
    /// The kind before any voice-to-text reclassification, so downstream
    /// re-entrant composition can waive prefix matching correctly.
    pub origin_kind: ContextKind,
    /// Reply kind the user asked for (e.g. voice replies to voice input).
    pub desire_reply: Option<ReplyKind>,
    pub group_name: Option<String>,
    /// The origin message this context was composed from.
    pub message: Message,
}

impl Context {
    /// Derives a TEXT context from this one, preserving the origin kind.
    /// Used when a voice transcription or sharing conversion re-enters the
    /// composer as text.
    pub fn derive_text(&self, content: impl Into<String>) -> Self {
        let mut derived = self.clone();
        derived.kind = ContextKind::Text;
        derived.content = content.into();
        derived
    }
}

/// Classification of an outbound reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplyKind {
    Text,
    Image,
    ImageUrl,
    Voice,
    Video,
    VideoUrl,
    File,
    Link,
    Card,
    Emoji,
    AcceptFriend,
    Error,
    Info,
    Revoke,
}

/// An outbound reply. Created by the worker pipeline, mutated only by the
/// decoration step, consumed exactly once by the send path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub kind: ReplyKind,
    /// Text body, URL, or local file path depending on `kind`.
    pub content: String,
}

impl Reply {
    pub fn new(kind: ReplyKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(ReplyKind::Text, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(ReplyKind::Error, content)
    }

    pub fn info(content: impl Into<String>) -> Self {
        Self::new(ReplyKind::Info, content)
    }

    /// An explicit empty reply: the pipeline produced nothing to send.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
