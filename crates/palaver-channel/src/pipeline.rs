// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The worker pipeline: executes one context end to end.
//!
//! Plugin hooks first, then kind dispatch to the bot (with voice and sharing
//! contexts re-entering composition as text), then decoration and the send
//! path. One pipeline invocation corresponds to one dispatcher worker task.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use palaver_config::{PalaverConfig, ReplyConfig, TriggerConfig};
use palaver_core::error::PalaverError;
use palaver_core::traits::{Bot, ChannelBackend, GroupMemberCache};
use palaver_core::types::{Context, ContextKind, Reply, ReplyKind};
use palaver_plugin::{Event, EventContext, PluginManager};

use crate::compose::{check_contain, is_valuable_kind, Composer};
use crate::media::MediaCache;

pub struct WorkerPipeline {
    pub(crate) bot: Arc<dyn Bot>,
    pub(crate) backend: Arc<dyn ChannelBackend>,
    pub(crate) plugins: Arc<PluginManager>,
    pub(crate) composer: Arc<Composer>,
    pub(crate) members: Arc<dyn GroupMemberCache>,
    pub(crate) media: Arc<MediaCache>,
    pub(crate) trigger: TriggerConfig,
    pub(crate) reply: ReplyConfig,
}

impl WorkerPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: &PalaverConfig,
        bot: Arc<dyn Bot>,
        backend: Arc<dyn ChannelBackend>,
        plugins: Arc<PluginManager>,
        composer: Arc<Composer>,
        members: Arc<dyn GroupMemberCache>,
        media: Arc<MediaCache>,
    ) -> Self {
        Self {
            bot,
            backend,
            plugins,
            composer,
            members,
            media,
            trigger: config.trigger.clone(),
            reply: config.reply.clone(),
        }
    }

    /// Produces a reply for one context, or `None` for fire-and-forget kinds.
    ///
    /// Boxed because voice transcription and sharing conversion re-enter
    /// here recursively with a derived TEXT context.
    fn generate(&self, context: Context) -> BoxFuture<'_, Result<Option<Reply>, PalaverError>> {
        Box::pin(async move {
            let mut ectx = self
                .plugins
                .emit(
                    Event::HandleContext,
                    EventContext::with_reply(context.clone(), Reply::text("")),
                )
                .await;
            if let Some(reply) = &ectx.reply
                && !reply.is_empty()
            {
                debug!(kind = %reply.kind, "plugin handled context");
                return Ok(ectx.reply);
            }
            if ectx.is_pass() {
                return Ok(ectx.reply);
            }
            // Plugins may have rewritten the context in place.
            let context = ectx.context.take().unwrap_or(context);

            // Second trigger gate for group chats: the composer's first gate
            // already stripped prefixes, so this one looks at the raw inbound
            // content. Ambient group chatter without any trigger signal must
            // never reach the bot.
            if context.is_group && !self.group_gate(&context) {
                debug!("group message without valid trigger, skipping bot call");
                return Ok(Some(Reply::text("")));
            }

            match context.kind {
                ContextKind::Text | ContextKind::ImageCreate => {
                    self.bot.reply(&context.content, &context).await.map(Some)
                }
                ContextKind::Voice => {
                    let transcribed = self.bot.voice_to_text(&context.content).await?;
                    if transcribed.kind == ReplyKind::Text {
                        match self.composer.recompose_text(&context, transcribed.content) {
                            Some(text_context) => self.generate(text_context).await,
                            None => Ok(None),
                        }
                    } else {
                        Ok(Some(transcribed))
                    }
                }
                ContextKind::Image => {
                    // Inbound images are only cached for later multimodal use.
                    self.media.insert(
                        context.session_id.clone(),
                        context.content.clone(),
                        context.message.clone(),
                    );
                    debug!(session_id = %context.session_id, "inbound image cached");
                    Ok(None)
                }
                ContextKind::Sharing => {
                    if self.reply.sharing_to_text_enabled {
                        match self.composer.recompose_text(&context, context.content.clone()) {
                            Some(text_context) => self.generate(text_context).await,
                            None => Ok(None),
                        }
                    } else {
                        debug!("sharing message ignored, conversion disabled");
                        Ok(None)
                    }
                }
                ContextKind::AcceptFriend => Ok(Some(self.friend_request_reply(&context))),
                ContextKind::File | ContextKind::Video | ContextKind::Function => Ok(None),
                ContextKind::JoinGroup | ContextKind::ExitGroup | ContextKind::Patpat => {
                    // Group events have no default handling; plugins act on
                    // them at the HandleContext hook.
                    Ok(None)
                }
            }
        })
    }

    /// Trigger signals checked against the raw (unstripped) message content.
    fn group_gate(&self, context: &Context) -> bool {
        let raw = context.message.content.as_str();
        let is_plugin_command = raw.starts_with(&self.trigger.plugin_trigger_prefix);
        let has_group_prefix = self
            .trigger
            .group_chat_prefix
            .iter()
            .any(|p| !p.is_empty() && raw.starts_with(p.as_str()));
        let has_keyword = check_contain(raw, &self.trigger.group_chat_keyword);
        is_plugin_command
            || is_valuable_kind(context.kind)
            || has_group_prefix
            || context.message.is_at
            || has_keyword
    }

    fn friend_request_reply(&self, context: &Context) -> Reply {
        let accepted = self
            .trigger
            .accept_friend_commands
            .iter()
            .any(|c| c == context.content.trim());
        info!(accepted, "friend request verification");
        Reply::new(
            ReplyKind::AcceptFriend,
            if accepted { "true" } else { "false" },
        )
    }
}

#[async_trait]
impl crate::dispatch::ContextHandler for WorkerPipeline {
    async fn handle(&self, context: Context) -> Result<(), PalaverError> {
        if context.content.is_empty() {
            return Ok(());
        }
        debug!(session_id = %context.session_id, kind = %context.kind, "handling context");

        let Some(reply) = self.generate(context.clone()).await? else {
            return Ok(());
        };
        if reply.is_empty() {
            return Ok(());
        }
        debug!(kind = %reply.kind, "decorating reply");

        let Some(reply) = self.decorate_reply(&context, reply).await else {
            warn!("reply discarded during decoration");
            return Ok(());
        };
        self.send_reply(&context, reply).await
    }
}
