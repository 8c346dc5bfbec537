// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Palaver gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Palaver configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PalaverConfig {
    /// Bot identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Scheduler settings: queue concurrency, pool size, poll interval.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Trigger matching rules: prefixes, keywords, allow/black lists.
    #[serde(default)]
    pub trigger: TriggerConfig,

    /// Reply decoration settings.
    #[serde(default)]
    pub reply: ReplyConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot account (used for @-mention stripping).
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Backend user id of the bot account, for self-message suppression.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            user_id: None,
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "palaver".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Dispatcher scheduling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Maximum in-flight pipeline invocations per session.
    #[serde(default = "default_concurrency_in_session")]
    pub concurrency_in_session: usize,

    /// Global worker pool size, capping parallel work across all sessions.
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: usize,

    /// Consume loop poll interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Leading sigil marking a management command, granting queue priority.
    #[serde(default = "default_admin_sigil")]
    pub admin_sigil: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency_in_session: default_concurrency_in_session(),
            worker_pool_size: default_worker_pool_size(),
            poll_interval_ms: default_poll_interval_ms(),
            admin_sigil: default_admin_sigil(),
        }
    }
}

fn default_concurrency_in_session() -> usize {
    4
}

fn default_worker_pool_size() -> usize {
    8
}

fn default_poll_interval_ms() -> u64 {
    200
}

fn default_admin_sigil() -> String {
    "#".to_string()
}

/// Trigger matching configuration consumed by the context composer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerConfig {
    /// Prefixes that trigger the bot in private chats. An empty-string
    /// prefix means every private message triggers.
    #[serde(default = "default_single_chat_prefix")]
    pub single_chat_prefix: Vec<String>,

    /// Prefixes that trigger the bot in group chats.
    #[serde(default = "default_group_chat_prefix")]
    pub group_chat_prefix: Vec<String>,

    /// Keywords that trigger the bot anywhere in a group message.
    #[serde(default)]
    pub group_chat_keyword: Vec<String>,

    /// Groups the bot answers in, by exact name. "ALL_GROUP" allows every group.
    #[serde(default)]
    pub group_name_white_list: Vec<String>,

    /// Groups the bot answers in, by name keyword.
    #[serde(default)]
    pub group_name_keyword_white_list: Vec<String>,

    /// Groups whose members all share one conversation session.
    /// "ALL_GROUP" applies to every allowed group.
    #[serde(default)]
    pub group_chat_in_one_session: Vec<String>,

    /// Sender nicknames that never trigger the bot.
    #[serde(default)]
    pub nick_name_black_list: Vec<String>,

    /// Prefixes that reclassify a text message as an image-generation request.
    #[serde(default)]
    pub image_create_prefix: Vec<String>,

    /// Whether messages sent by the bot account itself may trigger it.
    /// On by default; dedicated bot accounts rarely talk to themselves and
    /// phone-paired accounts use self-sent messages as a control surface.
    #[serde(default = "default_trigger_by_self")]
    pub trigger_by_self: bool,

    /// Disable @-mention as a group trigger.
    #[serde(default)]
    pub group_at_off: bool,

    /// Leading sigil of plugin commands, exempt from the group second gate.
    #[serde(default = "default_plugin_trigger_prefix")]
    pub plugin_trigger_prefix: String,

    /// Friend-request verification messages that are auto-accepted.
    #[serde(default)]
    pub accept_friend_commands: Vec<String>,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            single_chat_prefix: default_single_chat_prefix(),
            group_chat_prefix: default_group_chat_prefix(),
            group_chat_keyword: Vec::new(),
            group_name_white_list: Vec::new(),
            group_name_keyword_white_list: Vec::new(),
            group_chat_in_one_session: Vec::new(),
            nick_name_black_list: Vec::new(),
            image_create_prefix: Vec::new(),
            trigger_by_self: default_trigger_by_self(),
            group_at_off: false,
            plugin_trigger_prefix: default_plugin_trigger_prefix(),
            accept_friend_commands: Vec::new(),
        }
    }
}

fn default_single_chat_prefix() -> Vec<String> {
    vec![String::new()]
}

fn default_group_chat_prefix() -> Vec<String> {
    vec!["@bot".to_string()]
}

fn default_plugin_trigger_prefix() -> String {
    "$".to_string()
}

fn default_trigger_by_self() -> bool {
    true
}

/// Reply decoration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReplyConfig {
    /// Text prepended to private-chat text replies.
    #[serde(default)]
    pub single_chat_reply_prefix: String,

    /// Text appended to private-chat text replies.
    #[serde(default)]
    pub single_chat_reply_suffix: String,

    /// Text prepended to group-chat text replies (after the @-mention line).
    #[serde(default)]
    pub group_chat_reply_prefix: String,

    /// Text appended to group-chat text replies.
    #[serde(default)]
    pub group_chat_reply_suffix: String,

    /// Suppress the @-mention line on group text replies.
    #[serde(default)]
    pub no_need_at: bool,

    /// Answer every text message with synthesized voice when supported.
    #[serde(default)]
    pub always_reply_voice: bool,

    /// Answer voice messages with synthesized voice when supported.
    #[serde(default)]
    pub voice_reply_voice: bool,

    /// Convert sharing messages to text and feed them to the bot.
    #[serde(default)]
    pub sharing_to_text_enabled: bool,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            single_chat_reply_prefix: String::new(),
            single_chat_reply_suffix: String::new(),
            group_chat_reply_prefix: String::new(),
            group_chat_reply_suffix: String::new(),
            no_need_at: false,
            always_reply_voice: false,
            voice_reply_voice: false,
            sharing_to_text_enabled: false,
        }
    }
}
