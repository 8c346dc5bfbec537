// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Palaver chat-bot gateway.
//!
//! This crate provides the canonical message model (Message / Context /
//! Reply), the shared error type, and the adapter traits the gateway core
//! consumes from its external collaborators.

pub mod error;
pub mod traits;
pub mod types;

pub use error::PalaverError;
pub use types::{
    Context, ContextKind, Message, MessageId, MessageKind, Reply, ReplyKind, SessionId,
};

pub use traits::{Bot, ChannelBackend, GroupMemberCache, MessageNormalizer, SessionControl};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_construct_and_display() {
        let not_supported = PalaverError::NotSupported("send voice".into());
        assert_eq!(not_supported.to_string(), "not supported: send voice");

        let channel = PalaverError::channel("connection reset");
        assert!(channel.to_string().contains("connection reset"));

        let bot = PalaverError::bot("model not found");
        assert!(bot.to_string().contains("model not found"));
    }

    #[test]
    fn session_ids_compare_by_value() {
        let a = SessionId::from("user@@group");
        let b = SessionId("user@@group".into());
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "user@@group");
    }
}
