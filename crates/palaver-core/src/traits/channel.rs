// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel backend trait for messaging transport integrations.

use async_trait::async_trait;

use crate::error::PalaverError;
use crate::types::{Context, Reply, ReplyKind};

/// Outbound half of a messaging backend.
///
/// The gateway core only ever talks to the wire through this trait; the
/// concrete protocol (HTTP, WebSocket, ...) is the implementor's concern.
#[async_trait]
pub trait ChannelBackend: Send + Sync {
    /// Short identifier used in logs: "wxpad", "dev", ...
    fn name(&self) -> &str;

    /// Whether this backend can deliver replies of the given kind.
    /// Unsupported kinds are coerced to error replies during decoration.
    fn supports(&self, _kind: ReplyKind) -> bool {
        true
    }

    /// Whether private chats on this backend need no trigger prefix
    /// (e.g. dedicated bot accounts where every message is for the bot).
    fn no_need_prefix(&self) -> bool {
        false
    }

    /// Delivers one reply to the receiver carried by the context.
    ///
    /// Implementations should return [`PalaverError::NotSupported`] for
    /// capabilities they lack; any other error is retried by the caller.
    async fn send(&self, reply: &Reply, context: &Context) -> Result<(), PalaverError>;
}
