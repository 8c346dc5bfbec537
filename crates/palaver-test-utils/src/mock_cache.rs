// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed group-member display-name table.

use std::collections::HashMap;

use async_trait::async_trait;

use palaver_core::traits::GroupMemberCache;

/// A member cache backed by a fixed `(group, user) -> name` table.
#[derive(Default)]
pub struct StaticMemberCache {
    names: HashMap<(String, String), String>,
}

impl StaticMemberCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, group_id: &str, user_id: &str, name: &str) -> Self {
        self.names
            .insert((group_id.to_string(), user_id.to_string()), name.to_string());
        self
    }
}

#[async_trait]
impl GroupMemberCache for StaticMemberCache {
    async fn display_name(&self, group_id: &str, user_id: &str) -> Option<String> {
        self.names
            .get(&(group_id.to_string(), user_id.to_string()))
            .cloned()
    }
}
