// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The context composer: decides whether an inbound message is eligible for
//! processing at all, and if so builds the routing [`Context`] for it.
//!
//! All trigger-matching rules live here. Ineligibility is the common case
//! and is expressed as a plain `None`, never as an error.

use regex::Regex;
use tracing::{debug, info, warn};

use palaver_config::{PalaverConfig, ReplyConfig, TriggerConfig};
use palaver_core::types::{Context, ContextKind, Message, ReplyKind, SessionId};
use palaver_plugin::{Event, EventContext, PluginManager};

/// Capabilities of the active backend that influence composition.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendTraits {
    /// Private chats need no trigger prefix on this backend.
    pub no_need_prefix: bool,
    /// The backend can deliver voice replies.
    pub supports_voice: bool,
}

/// Builds routing contexts from normalized messages.
///
/// Trigger rules are re-read from the captured config on every message;
/// in particular the shared-session decision for a group is re-derived per
/// message rather than pinned at first contact, matching the upstream
/// behavior this gateway mirrors.
pub struct Composer {
    trigger: TriggerConfig,
    reply: ReplyConfig,
    bot_name: String,
    bot_user_id: Option<String>,
    backend: BackendTraits,
}

impl Composer {
    pub fn new(config: &PalaverConfig, backend: BackendTraits) -> Self {
        Self {
            trigger: config.trigger.clone(),
            reply: config.reply.clone(),
            bot_name: config.agent.name.clone(),
            bot_user_id: config.agent.user_id.clone(),
            backend,
        }
    }

    /// Composes a context for a fresh inbound message.
    ///
    /// Returns `None` when the message is not eligible: non-user sender,
    /// group not on the allow-list, blacklisted nickname, self message, or
    /// no trigger matched.
    pub async fn compose(
        &self,
        kind: ContextKind,
        content: String,
        message: &Message,
        plugins: &PluginManager,
    ) -> Option<Context> {
        if message.is_non_user() {
            info!(from = message.from_user_id.as_str(), "ignoring non-user message");
            return None;
        }

        let (session_id, receiver, shared) = self.derive_session(message)?;

        let context = Context {
            kind,
            content,
            session_id,
            receiver,
            is_group: message.is_group,
            shared_session_group: shared,
            origin_kind: kind,
            desire_reply: None,
            group_name: if message.is_group {
                message.other_user_nickname.clone()
            } else {
                None
            },
            message: message.clone(),
        };

        // First build for this conversation: give plugins a chance to veto
        // or replace the context before any trigger matching happens.
        let ectx = plugins
            .emit(Event::ReceiveMessage, EventContext::with_context(context))
            .await;
        let context = ectx.context?;
        if ectx.action == palaver_plugin::EventAction::BreakPass {
            return Some(context);
        }

        if let Some(bot_id) = &self.bot_user_id
            && message.from_user_id == *bot_id
            && !self.trigger.trigger_by_self
        {
            debug!("self message skipped");
            return None;
        }

        self.match_triggers(context)
    }

    /// Re-composes a derived TEXT context (voice transcription, sharing
    /// conversion). Session routing is inherited from the parent; the origin
    /// kind is preserved so voice-originated text bypasses prefix matching.
    pub fn recompose_text(&self, parent: &Context, content: impl Into<String>) -> Option<Context> {
        self.match_triggers(parent.derive_text(content))
    }

    /// Session-id derivation. For private chats the peer id; for group chats
    /// gated by the allow-list, then either the group id (shared-session
    /// group) or the composite `{actual_user}@@{group}` key that prevents
    /// cross-member bleed of conversation history.
    fn derive_session(&self, message: &Message) -> Option<(SessionId, String, bool)> {
        if !message.is_group {
            let peer = message.other_user_id.clone();
            return Some((SessionId(peer.clone()), peer, false));
        }

        let group_id = &message.other_user_id;
        let group_name = message.other_user_nickname.as_deref().unwrap_or("");

        let allowed = self.trigger.group_name_white_list.iter().any(|n| n == group_name)
            || self.trigger.group_name_white_list.iter().any(|n| n == "ALL_GROUP")
            || check_contain(group_name, &self.trigger.group_name_keyword_white_list);
        if !allowed {
            debug!(group = group_name, "group not in whitelist, no reply needed");
            return None;
        }

        let shared = self
            .trigger
            .group_chat_in_one_session
            .iter()
            .any(|n| n == group_name || n == "ALL_GROUP");
        let session_id = if shared {
            SessionId(group_id.clone())
        } else {
            let actual = message
                .actual_user_id
                .as_deref()
                .unwrap_or(&message.from_user_id);
            SessionId(format!("{actual}@@{group_id}"))
        };
        Some((session_id, group_id.clone(), shared))
    }

    /// Content-level trigger matching. Consumes the context and returns the
    /// (possibly rewritten) eligible context, or `None` to drop.
    fn match_triggers(&self, mut context: Context) -> Option<Context> {
        match context.kind {
            ContextKind::Text => {}
            ContextKind::AcceptFriend => return Some(context),
            ContextKind::Voice => {
                if self.reply.voice_reply_voice && self.backend.supports_voice {
                    context.desire_reply = Some(ReplyKind::Voice);
                }
                return Some(context);
            }
            _ => {
                if context.is_group {
                    // High-value kinds pass without a prefix; anything else
                    // unrecognized in a group is dropped.
                    if is_valuable_kind(context.kind)
                        || matches!(
                            context.kind,
                            ContextKind::JoinGroup | ContextKind::ExitGroup | ContextKind::Patpat
                        )
                    {
                        info!(kind = %context.kind, "high-value group message passes untriggered");
                        return Some(context);
                    }
                    debug!(kind = %context.kind, "unrecognized kind filtered in group chat");
                    return None;
                }
                return Some(context);
            }
        }

        let mut content = context.content.clone();
        if context.is_group {
            // The actual speaker being the bot itself is skipped outright.
            if let Some(bot_id) = &self.bot_user_id {
                let actual = context
                    .message
                    .actual_user_id
                    .as_deref()
                    .unwrap_or(&context.message.from_user_id);
                if actual == bot_id || context.message.from_user_id == *bot_id {
                    debug!("skip self message in group");
                    return None;
                }
            }

            let match_prefix = check_prefix(&content, &self.trigger.group_chat_prefix);
            let match_contain = check_contain(&content, &self.trigger.group_chat_keyword);
            let mut triggered = false;
            if let Some(prefix) = match_prefix {
                content = content.replacen(prefix, "", 1).trim().to_string();
                triggered = true;
            } else if match_contain {
                triggered = true;
            }

            if context.message.is_at {
                if self.nickname_blacklisted(context.message.actual_user_nickname.as_deref()) {
                    return None;
                }
                info!("received group at");
                if !self.trigger.group_at_off {
                    triggered = true;
                }
                content = self.strip_at_tokens(&content, &context.message);
            }

            if !triggered {
                debug!(content = content.as_str(), "group message matched no trigger");
                return None;
            }
        } else {
            if self.nickname_blacklisted(context.message.from_user_nickname.as_deref()) {
                return None;
            }

            if let Some(prefix) = check_prefix(&content, &self.trigger.single_chat_prefix) {
                content = content.replacen(prefix, "", 1).trim().to_string();
            } else if self.backend.no_need_prefix {
                // Dedicated bot accounts: every private message is for us.
            } else if context.origin_kind == ContextKind::Voice {
                // Voice transcriptions bypass prefix matching: the user
                // cannot reasonably speak a trigger prefix.
            } else {
                return None;
            }
        }

        let content = content.trim();
        // An empty prefix entry must not reclassify everything to ImageCreate.
        if let Some(prefix) = check_prefix(content, &self.trigger.image_create_prefix)
            .filter(|p| !p.is_empty())
        {
            context.kind = ContextKind::ImageCreate;
            context.content = content.replacen(prefix, "", 1).trim().to_string();
        } else {
            context.kind = ContextKind::Text;
            context.content = content.to_string();
        }

        if context.desire_reply.is_none()
            && (self.reply.always_reply_voice
                || (context.origin_kind == ContextKind::Voice && self.reply.voice_reply_voice))
            && self.backend.supports_voice
        {
            context.desire_reply = Some(ReplyKind::Voice);
        }

        Some(context)
    }

    fn nickname_blacklisted(&self, nickname: Option<&str>) -> bool {
        let Some(nick) = nickname else { return false };
        if !nick.is_empty() && self.trigger.nick_name_black_list.iter().any(|n| n == nick) {
            warn!(nickname = nick, "nickname in blacklist, ignoring");
            return true;
        }
        false
    }

    /// Strips `@name ` tokens for the bot's display name, every explicit
    /// at-list entry, and the bot's in-group display name. The separator
    /// after an at-token is either U+2005 (the at-separator the backend
    /// emits) or an ordinary space.
    fn strip_at_tokens(&self, content: &str, message: &Message) -> String {
        let mut result = strip_at_name(content, &self.bot_name);
        for at in &message.at_list {
            result = strip_at_name(&result, at);
        }
        if result == content
            && let Some(display) = &message.self_display_name
        {
            result = strip_at_name(content, display);
        }
        // Final sweep: any leading `@word ` still present.
        if let Ok(re) = Regex::new(r"^@\S+\s+") {
            result = re.replace(&result, "").to_string();
        }
        result
    }
}

fn strip_at_name(content: &str, name: &str) -> String {
    if name.is_empty() {
        return content.to_string();
    }
    let pattern = format!("@{}([\u{2005}\u{0020}])", regex::escape(name));
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(content, "").to_string(),
        Err(_) => content.to_string(),
    }
}

/// First configured prefix the content starts with.
pub fn check_prefix<'a>(content: &str, prefixes: &'a [String]) -> Option<&'a str> {
    prefixes
        .iter()
        .find(|p| content.starts_with(p.as_str()))
        .map(|p| p.as_str())
}

/// Whether any configured keyword occurs in the content.
pub fn check_contain(content: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| !k.is_empty() && content.contains(k.as_str()))
}

/// Kinds valuable enough to pass group gating without a prefix.
pub fn is_valuable_kind(kind: ContextKind) -> bool {
    matches!(
        kind,
        ContextKind::File | ContextKind::Video | ContextKind::Image | ContextKind::Sharing
    )
}
