// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply decoration: the pure-ish transform applied to every reply before it
//! reaches the transport. Coerces unsupported kinds to errors, resolves
//! IMAGE_URL replies to local files, substitutes voice synthesis, and wraps
//! text replies with @-mentions and configured prefixes/suffixes.

use futures::future::BoxFuture;
use tracing::{error, warn};
use uuid::Uuid;

use palaver_core::types::{Context, Reply, ReplyKind};
use palaver_plugin::{Event, EventContext};

use crate::pipeline::WorkerPipeline;

impl WorkerPipeline {
    /// Decorates one reply for its context. `None` means the reply is
    /// unsendable and must be discarded.
    ///
    /// Boxed because voice synthesis substitutes a fresh reply that is
    /// decorated again from the top.
    pub(crate) fn decorate_reply<'a>(
        &'a self,
        context: &'a Context,
        reply: Reply,
    ) -> BoxFuture<'a, Option<Reply>> {
        Box::pin(async move {
            let ectx = self
                .plugins
                .emit(Event::DecorateReply, EventContext::with_reply(context.clone(), reply))
                .await;
            let pass = ectx.is_pass();
            let mut reply = ectx.reply?;
            if pass {
                return Some(reply);
            }

            if !self.backend.supports(reply.kind) {
                error!(kind = %reply.kind, backend = self.backend.name(), "reply kind not supported");
                reply = Reply::error(format!("unsupported reply kind: {}", reply.kind));
            }

            if reply.kind == ReplyKind::ImageUrl {
                reply = match download_image_to_tmp(&reply.content).await {
                    Some(path) => Reply::new(ReplyKind::Image, path),
                    None => Reply::error("image download failed, nothing was sent"),
                };
            }

            match reply.kind {
                ReplyKind::Text => {
                    if context.desire_reply == Some(ReplyKind::Voice)
                        && self.backend.supports(ReplyKind::Voice)
                    {
                        match self.bot.text_to_voice(&reply.content).await {
                            Ok(voice) => return self.decorate_reply(context, voice).await,
                            Err(e) => {
                                warn!(error = %e, "voice synthesis failed, sending text instead")
                            }
                        }
                    }
                    reply.content = if context.is_group {
                        let mut text = reply.content.trim().to_string();
                        if !self.reply.no_need_at {
                            let at_name = self.mention_name(context).await;
                            text = format!("@{at_name}\n{text}");
                        }
                        format!(
                            "{}{}{}",
                            self.reply.group_chat_reply_prefix,
                            text,
                            self.reply.group_chat_reply_suffix
                        )
                    } else {
                        format!(
                            "{}{}{}",
                            self.reply.single_chat_reply_prefix,
                            reply.content,
                            self.reply.single_chat_reply_suffix
                        )
                    };
                }
                ReplyKind::Error | ReplyKind::Info => {
                    reply.content = format!("[{}]\n{}", reply.kind, reply.content);
                }
                ReplyKind::Image
                | ReplyKind::ImageUrl
                | ReplyKind::Voice
                | ReplyKind::Video
                | ReplyKind::VideoUrl
                | ReplyKind::File
                | ReplyKind::Link
                | ReplyKind::Card
                | ReplyKind::Emoji
                | ReplyKind::Revoke
                | ReplyKind::AcceptFriend => {}
            }

            if let Some(desired) = context.desire_reply
                && desired != reply.kind
                && !matches!(reply.kind, ReplyKind::Error | ReplyKind::Info)
            {
                warn!(desired = %desired, actual = %reply.kind, "reply kind differs from desired");
            }
            Some(reply)
        })
    }

    /// Display name for the @-mention line: member cache first, then the
    /// nicknames carried by the message, then a generic fallback.
    async fn mention_name(&self, context: &Context) -> String {
        let message = &context.message;
        let user_id = message
            .actual_user_id
            .as_deref()
            .unwrap_or(&message.from_user_id);
        if let Some(name) = self.members.display_name(&message.other_user_id, user_id).await {
            return name;
        }
        message
            .actual_user_nickname
            .clone()
            .or_else(|| message.from_user_nickname.clone())
            .unwrap_or_else(|| "member".to_string())
    }
}

/// Downloads an image URL into the system temp directory. `None` on any
/// failure; the caller coerces that to an error reply.
pub(crate) async fn download_image_to_tmp(url: &str) -> Option<String> {
    let response = match reqwest::get(url).await {
        Ok(r) => r,
        Err(e) => {
            warn!(url, error = %e, "image download request failed");
            return None;
        }
    };
    if !response.status().is_success() {
        warn!(url, status = %response.status(), "image download rejected");
        return None;
    }
    let bytes = match response.bytes().await {
        Ok(b) => b,
        Err(e) => {
            warn!(url, error = %e, "image download body failed");
            return None;
        }
    };

    let path = std::env::temp_dir().join(format!("palaver-img-{}.img", Uuid::new_v4()));
    match tokio::fs::write(&path, &bytes).await {
        Ok(()) => Some(path.to_string_lossy().into_owned()),
        Err(e) => {
            warn!(error = %e, "writing downloaded image failed");
            None
        }
    }
}
