// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits: the seams between the gateway core and its external
//! collaborators (transport, LLM, member cache, normalizer).

pub mod bot;
pub mod cache;
pub mod channel;
pub mod control;
pub mod normalizer;

pub use bot::Bot;
pub use cache::GroupMemberCache;
pub use channel::ChannelBackend;
pub use control::SessionControl;
pub use normalizer::MessageNormalizer;
