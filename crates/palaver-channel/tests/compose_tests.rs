// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composer trigger-rule tests: session derivation, group gating, prefix and
//! @-mention matching.

use std::sync::Arc;

use async_trait::async_trait;

use palaver_channel::{BackendTraits, Composer};
use palaver_config::PalaverConfig;
use palaver_core::types::{Context, ContextKind, MessageKind, ReplyKind};
use palaver_plugin::{Event, EventAction, EventContext, Plugin, PluginManager};
use palaver_test_utils::fixtures;

fn composer(config: &PalaverConfig) -> Composer {
    Composer::new(config, BackendTraits::default())
}

fn base_config() -> PalaverConfig {
    let mut config = PalaverConfig::default();
    config.agent.name = "Bot".to_string();
    config.agent.user_id = Some("bot-id".to_string());
    config.trigger.group_name_white_list = vec!["testers".to_string()];
    config
}

#[tokio::test]
async fn private_text_with_empty_prefix_composes() {
    let config = base_config();
    let plugins = PluginManager::new();
    let message = fixtures::private_text("u1", "hello");

    let ctx = composer(&config)
        .compose(ContextKind::Text, "hello".into(), &message, &plugins)
        .await
        .expect("should compose");

    assert_eq!(ctx.session_id.as_str(), "u1");
    assert_eq!(ctx.receiver, "u1");
    assert_eq!(ctx.kind, ContextKind::Text);
    assert_eq!(ctx.content, "hello");
    assert!(!ctx.is_group);
}

#[tokio::test]
async fn private_text_without_matching_prefix_drops() {
    let mut config = base_config();
    config.trigger.single_chat_prefix = vec!["bot".to_string()];
    let plugins = PluginManager::new();
    let message = fixtures::private_text("u1", "hello");

    let ctx = composer(&config)
        .compose(ContextKind::Text, "hello".into(), &message, &plugins)
        .await;
    assert!(ctx.is_none());
}

#[tokio::test]
async fn group_at_mention_strips_name_and_derives_composite_session() {
    let config = base_config();
    let plugins = PluginManager::new();
    let mut message = fixtures::group_text("g1", "testers", "u1", "@Bot\u{2005}what's the weather");
    message.is_at = true;

    let ctx = composer(&config)
        .compose(
            ContextKind::Text,
            message.content.clone(),
            &message,
            &plugins,
        )
        .await
        .expect("should compose");

    assert_eq!(ctx.session_id.as_str(), "u1@@g1");
    assert_eq!(ctx.receiver, "g1");
    assert_eq!(ctx.content, "what's the weather");
    assert!(!ctx.shared_session_group);
}

#[tokio::test]
async fn group_text_without_any_trigger_drops() {
    let config = base_config();
    let plugins = PluginManager::new();
    let message = fixtures::group_text("g1", "testers", "u1", "random chat");

    let ctx = composer(&config)
        .compose(ContextKind::Text, "random chat".into(), &message, &plugins)
        .await;
    assert!(ctx.is_none());
}

#[tokio::test]
async fn group_not_on_allow_list_drops() {
    let config = base_config();
    let plugins = PluginManager::new();
    let mut message = fixtures::group_text("g2", "strangers", "u1", "@Bot hi");
    message.is_at = true;

    let ctx = composer(&config)
        .compose(ContextKind::Text, "@Bot hi".into(), &message, &plugins)
        .await;
    assert!(ctx.is_none());
}

#[tokio::test]
async fn all_group_wildcard_admits_any_group() {
    let mut config = base_config();
    config.trigger.group_name_white_list = vec!["ALL_GROUP".to_string()];
    config.trigger.group_chat_prefix = vec!["@bot".to_string()];
    let plugins = PluginManager::new();
    let message = fixtures::group_text("g9", "anything", "u1", "@bot hi");

    let ctx = composer(&config)
        .compose(ContextKind::Text, "@bot hi".into(), &message, &plugins)
        .await
        .expect("should compose");
    assert_eq!(ctx.content, "hi");
}

#[tokio::test]
async fn shared_session_group_collapses_to_group_id() {
    let mut config = base_config();
    config.trigger.group_chat_in_one_session = vec!["testers".to_string()];
    config.trigger.group_chat_prefix = vec!["@bot".to_string()];
    let plugins = PluginManager::new();
    let message = fixtures::group_text("g1", "testers", "u1", "@bot hi");

    let ctx = composer(&config)
        .compose(ContextKind::Text, "@bot hi".into(), &message, &plugins)
        .await
        .expect("should compose");
    assert_eq!(ctx.session_id.as_str(), "g1");
    assert!(ctx.shared_session_group);
}

#[tokio::test]
async fn private_and_group_sessions_never_collide() {
    let mut config = base_config();
    config.trigger.group_chat_prefix = vec!["@bot".to_string()];
    let plugins = PluginManager::new();
    let comp = composer(&config);

    let private = comp
        .compose(
            ContextKind::Text,
            "hi".into(),
            &fixtures::private_text("u1", "hi"),
            &plugins,
        )
        .await
        .expect("should compose");
    let g1 = comp
        .compose(
            ContextKind::Text,
            "@bot hi".into(),
            &fixtures::group_text("g1", "testers", "u1", "@bot hi"),
            &plugins,
        )
        .await
        .expect("should compose");
    let g2 = comp
        .compose(
            ContextKind::Text,
            "@bot hi".into(),
            &fixtures::group_text("g2", "testers", "u1", "@bot hi"),
            &plugins,
        )
        .await
        .expect("should compose");

    assert_ne!(private.session_id, g1.session_id);
    assert_ne!(g1.session_id, g2.session_id);
}

#[tokio::test]
async fn blacklisted_nickname_is_ignored() {
    let mut config = base_config();
    config.trigger.nick_name_black_list = vec!["nick-u1".to_string()];
    let plugins = PluginManager::new();
    let message = fixtures::private_text("u1", "hello");

    let ctx = composer(&config)
        .compose(ContextKind::Text, "hello".into(), &message, &plugins)
        .await;
    assert!(ctx.is_none());
}

#[tokio::test]
async fn non_user_message_is_dropped() {
    let config = base_config();
    let plugins = PluginManager::new();
    let mut message = fixtures::private_text("broadcast", "news");
    message.kind = MessageKind::NonUser;

    let ctx = composer(&config)
        .compose(ContextKind::Text, "news".into(), &message, &plugins)
        .await;
    assert!(ctx.is_none());
}

#[tokio::test]
async fn image_create_prefix_reclassifies() {
    let mut config = base_config();
    config.trigger.image_create_prefix = vec!["draw".to_string()];
    let plugins = PluginManager::new();
    let message = fixtures::private_text("u1", "draw a cat");

    let ctx = composer(&config)
        .compose(ContextKind::Text, "draw a cat".into(), &message, &plugins)
        .await
        .expect("should compose");
    assert_eq!(ctx.kind, ContextKind::ImageCreate);
    assert_eq!(ctx.content, "a cat");
}

#[tokio::test]
async fn voice_origin_bypasses_private_prefix() {
    let mut config = base_config();
    config.trigger.single_chat_prefix = vec!["bot".to_string()];
    let comp = composer(&config);

    let mut parent = fixtures::private_context("u1", "voice.mp3");
    parent.kind = ContextKind::Voice;
    parent.origin_kind = ContextKind::Voice;

    let ctx = comp
        .recompose_text(&parent, "hello there")
        .expect("transcription should pass without prefix");
    assert_eq!(ctx.kind, ContextKind::Text);
    assert_eq!(ctx.content, "hello there");
    assert_eq!(ctx.origin_kind, ContextKind::Voice);
}

#[tokio::test]
async fn group_image_passes_without_trigger() {
    let config = base_config();
    let plugins = PluginManager::new();
    let mut message = fixtures::group_text("g1", "testers", "u1", "/tmp/pic.png");
    message.kind = MessageKind::Image;

    let ctx = composer(&config)
        .compose(
            ContextKind::Image,
            "/tmp/pic.png".into(),
            &message,
            &plugins,
        )
        .await
        .expect("should compose");
    assert_eq!(ctx.kind, ContextKind::Image);
}

struct SwallowPlugin;

#[async_trait]
impl Plugin for SwallowPlugin {
    fn name(&self) -> &str {
        "swallow"
    }

    async fn on_event(&self, event: Event, ectx: &mut EventContext) {
        if event == Event::ReceiveMessage {
            if let Some(ctx) = &mut ectx.context {
                ctx.content = "rewritten".to_string();
            }
            ectx.action = EventAction::BreakPass;
        }
    }
}

#[tokio::test]
async fn receive_hook_can_short_circuit_trigger_matching() {
    let mut config = base_config();
    // Without the plugin this prefix would drop the message.
    config.trigger.single_chat_prefix = vec!["bot".to_string()];
    let mut plugins = PluginManager::new();
    plugins.register(Arc::new(SwallowPlugin));
    let message = fixtures::private_text("u1", "hello");

    let ctx: Option<Context> = composer(&config)
        .compose(ContextKind::Text, "hello".into(), &message, &plugins)
        .await;
    let ctx = ctx.expect("plugin takes the context over");
    assert_eq!(ctx.content, "rewritten");
}

#[tokio::test]
async fn voice_input_desires_voice_reply_when_configured() {
    let mut config = base_config();
    config.reply.voice_reply_voice = true;
    let comp = Composer::new(
        &config,
        BackendTraits {
            no_need_prefix: false,
            supports_voice: true,
        },
    );
    let plugins = PluginManager::new();
    let mut message = fixtures::private_text("u1", "voice.mp3");
    message.kind = MessageKind::Voice;

    let ctx = comp
        .compose(ContextKind::Voice, "voice.mp3".into(), &message, &plugins)
        .await
        .expect("voice passes");
    assert_eq!(ctx.desire_reply, Some(ReplyKind::Voice));
}

#[tokio::test]
async fn group_keyword_triggers_without_prefix_or_mention() {
    let mut config = base_config();
    config.trigger.group_chat_prefix = vec!["@bot".to_string()];
    config.trigger.group_chat_keyword = vec!["palaver".to_string()];
    let plugins = PluginManager::new();
    let message = fixtures::group_text("g1", "testers", "u1", "is palaver awake?");

    let ctx = composer(&config)
        .compose(ContextKind::Text, "is palaver awake?".into(), &message, &plugins)
        .await
        .expect("keyword should trigger");
    assert_eq!(ctx.kind, ContextKind::Text);
    assert_eq!(ctx.content, "is palaver awake?");
    assert_eq!(ctx.session_id.as_str(), "u1@@g1");
}

#[tokio::test]
async fn own_private_messages_trigger_unless_disabled() {
    let config = base_config();
    let plugins = PluginManager::new();
    let message = fixtures::private_text("bot-id", "note to self");

    let ctx = composer(&config)
        .compose(ContextKind::Text, "note to self".into(), &message, &plugins)
        .await;
    assert!(ctx.is_some(), "self messages trigger by default");

    let mut config = base_config();
    config.trigger.trigger_by_self = false;
    let ctx = composer(&config)
        .compose(ContextKind::Text, "note to self".into(), &message, &plugins)
        .await;
    assert!(ctx.is_none(), "disabling trigger_by_self suppresses them");
}

#[tokio::test]
async fn empty_image_create_prefix_entry_is_ignored() {
    let mut config = base_config();
    config.trigger.image_create_prefix = vec![String::new(), "draw".to_string()];
    let plugins = PluginManager::new();

    let message = fixtures::private_text("u1", "hello");
    let ctx = composer(&config)
        .compose(ContextKind::Text, "hello".into(), &message, &plugins)
        .await
        .expect("should compose");
    assert_eq!(ctx.kind, ContextKind::Text);
    assert_eq!(ctx.content, "hello");

    let message = fixtures::private_text("u1", "draw a cat");
    let ctx = composer(&config)
        .compose(ContextKind::Text, "draw a cat".into(), &message, &plugins)
        .await
        .expect("should compose");
    assert_eq!(ctx.kind, ContextKind::ImageCreate);
}
