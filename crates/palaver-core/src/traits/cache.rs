// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Group member display-name lookup.

use async_trait::async_trait;

/// Resolves the display name a group member should be @-mentioned with.
///
/// Implementors are expected to consult a local cache first and refresh from
/// the backend on a miss; the gateway core only sees the resolved name.
#[async_trait]
pub trait GroupMemberCache: Send + Sync {
    /// Returns the member's display name, or `None` when unknown.
    async fn display_name(&self, group_id: &str, user_id: &str) -> Option<String>;
}
