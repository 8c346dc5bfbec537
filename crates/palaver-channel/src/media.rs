// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session store of the last inbound image, consumed by multimodal
//! follow-up handling (e.g. a plugin asking the bot about "this picture").

use std::collections::HashMap;
use std::sync::Mutex;

use palaver_core::types::{Message, SessionId};

#[derive(Debug, Clone)]
pub struct CachedMedia {
    /// Local path of the downloaded image.
    pub path: String,
    /// The inbound message the image arrived with.
    pub message: Message,
}

/// Last-image-per-session cache. Insertion overwrites; there is exactly one
/// slot per session.
#[derive(Default)]
pub struct MediaCache {
    entries: Mutex<HashMap<SessionId, CachedMedia>>,
}

impl MediaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session_id: SessionId, path: String, message: Message) {
        self.lock().insert(session_id, CachedMedia { path, message });
    }

    pub fn get(&self, session_id: &SessionId) -> Option<CachedMedia> {
        self.lock().get(session_id).cloned()
    }

    /// Removes and returns the cached image, if any.
    pub fn take(&self, session_id: &SessionId) -> Option<CachedMedia> {
        self.lock().remove(session_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SessionId, CachedMedia>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::types::{MessageId, MessageKind};

    fn message() -> Message {
        Message {
            msg_id: MessageId("m1".into()),
            kind: MessageKind::Image,
            content: "/tmp/a.png".into(),
            from_user_id: "u1".into(),
            from_user_nickname: None,
            to_user_id: "bot".into(),
            other_user_id: "u1".into(),
            other_user_nickname: None,
            actual_user_id: None,
            actual_user_nickname: None,
            self_display_name: None,
            is_group: false,
            is_at: false,
            at_list: Vec::new(),
            create_time: 0,
        }
    }

    #[test]
    fn insert_overwrites_previous_image() {
        let cache = MediaCache::new();
        let sid = SessionId("s1".into());
        cache.insert(sid.clone(), "/tmp/a.png".into(), message());
        cache.insert(sid.clone(), "/tmp/b.png".into(), message());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&sid).map(|m| m.path), Some("/tmp/b.png".into()));
    }

    #[test]
    fn take_empties_the_slot() {
        let cache = MediaCache::new();
        let sid = SessionId("s1".into());
        cache.insert(sid.clone(), "/tmp/a.png".into(), message());
        assert!(cache.take(&sid).is_some());
        assert!(cache.take(&sid).is_none());
        assert!(cache.is_empty());
    }
}
