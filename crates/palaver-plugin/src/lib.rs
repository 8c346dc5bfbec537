// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin hook bus for the Palaver gateway.
//!
//! Plugins observe and mutate the message flow at four hook points:
//! message received, context handled, reply decorated, reply sent. A plugin
//! may let the event continue, stop further plugins, or mark the event as
//! fully handled so the default pipeline behavior is skipped as well.

pub mod admin;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use palaver_core::types::{Context, Reply};

pub use admin::AdminCommands;

/// Hook points a plugin can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// A context was composed for a new inbound message.
    ReceiveMessage,
    /// A context is about to be handled by the worker pipeline.
    HandleContext,
    /// A reply is about to be decorated.
    DecorateReply,
    /// A reply is about to be sent.
    SendReply,
}

/// What the remaining plugins and the default pipeline should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventAction {
    /// Keep offering the event to later plugins, then run the default.
    #[default]
    Continue,
    /// Stop offering the event to later plugins; still run the default.
    Break,
    /// Event fully handled: skip later plugins and the default behavior.
    BreakPass,
}

/// Mutable payload passed through the plugin chain for one event.
#[derive(Debug, Default)]
pub struct EventContext {
    pub action: EventAction,
    pub context: Option<Context>,
    pub reply: Option<Reply>,
}

impl EventContext {
    pub fn with_context(context: Context) -> Self {
        Self {
            action: EventAction::Continue,
            context: Some(context),
            reply: None,
        }
    }

    pub fn with_reply(context: Context, reply: Reply) -> Self {
        Self {
            action: EventAction::Continue,
            context: Some(context),
            reply: Some(reply),
        }
    }

    /// True when a plugin marked the event as fully handled.
    pub fn is_pass(&self) -> bool {
        self.action == EventAction::BreakPass
    }
}

/// A compiled-in plugin observing gateway hook points.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Plugins run in descending priority order.
    fn priority(&self) -> i32 {
        0
    }

    /// Handle one event, mutating the payload in place.
    async fn on_event(&self, event: Event, ectx: &mut EventContext);
}

/// Ordered registry of plugins with event fan-out.
#[derive(Default)]
pub struct PluginManager {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin, keeping the chain sorted by descending priority.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
        self.plugins.sort_by_key(|p| std::cmp::Reverse(p.priority()));
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Offer one event to the plugin chain.
    ///
    /// Iteration stops at the first plugin that breaks; the returned payload
    /// carries the (possibly mutated) context and reply plus the final action.
    pub async fn emit(&self, event: Event, mut ectx: EventContext) -> EventContext {
        for plugin in &self.plugins {
            plugin.on_event(event, &mut ectx).await;
            if ectx.action != EventAction::Continue {
                debug!(
                    plugin = plugin.name(),
                    event = ?event,
                    action = ?ectx.action,
                    "plugin chain stopped"
                );
                break;
            }
        }
        ectx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::types::{
        ContextKind, Message, MessageId, MessageKind, ReplyKind, SessionId,
    };

    fn context() -> Context {
        Context {
            kind: ContextKind::Text,
            content: "hello".into(),
            session_id: SessionId("u1".into()),
            receiver: "u1".into(),
            is_group: false,
            shared_session_group: false,
            origin_kind: ContextKind::Text,
            desire_reply: None,
            group_name: None,
            message: Message {
                msg_id: MessageId("m1".into()),
                kind: MessageKind::Text,
                content: "hello".into(),
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
            },
        }
    }

    struct Tagger {
        name: &'static str,
        priority: i32,
        action: EventAction,
    }

    #[async_trait]
    impl Plugin for Tagger {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        async fn on_event(&self, _event: Event, ectx: &mut EventContext) {
            let reply = ectx.reply.take().unwrap_or_else(|| Reply::text(""));
            ectx.reply = Some(Reply::new(
                ReplyKind::Text,
                format!("{}{};", reply.content, self.name),
            ));
            ectx.action = self.action;
        }
    }

    #[tokio::test]
    async fn plugins_run_in_priority_order() {
        let mut manager = PluginManager::new();
        manager.register(Arc::new(Tagger {
            name: "low",
            priority: -1,
            action: EventAction::Continue,
        }));
        manager.register(Arc::new(Tagger {
            name: "high",
            priority: 10,
            action: EventAction::Continue,
        }));

        let ectx = manager
            .emit(Event::HandleContext, EventContext::with_context(context()))
            .await;
        assert_eq!(ectx.reply.unwrap().content, "high;low;");
    }

    #[tokio::test]
    async fn break_pass_stops_the_chain() {
        let mut manager = PluginManager::new();
        manager.register(Arc::new(Tagger {
            name: "first",
            priority: 1,
            action: EventAction::BreakPass,
        }));
        manager.register(Arc::new(Tagger {
            name: "second",
            priority: 0,
            action: EventAction::Continue,
        }));

        let ectx = manager
            .emit(Event::HandleContext, EventContext::with_context(context()))
            .await;
        assert!(ectx.is_pass());
        assert_eq!(ectx.reply.unwrap().content, "first;");
    }

    #[tokio::test]
    async fn empty_manager_returns_payload_unchanged() {
        let manager = PluginManager::new();
        let ectx = manager
            .emit(Event::ReceiveMessage, EventContext::with_context(context()))
            .await;
        assert_eq!(ectx.action, EventAction::Continue);
        assert!(ectx.context.is_some());
        assert!(ectx.reply.is_none());
    }
}
