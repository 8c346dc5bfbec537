// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in management commands, triggered by the admin sigil.
//!
//! Runs early in the HandleContext chain so sigil-prefixed messages never
//! reach the LLM. The dispatcher has already given these contexts queue
//! priority; this plugin supplies their behavior.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use palaver_core::traits::{Bot, SessionControl};
use palaver_core::types::{ContextKind, Reply};

use crate::{Event, EventAction, EventContext, Plugin};

/// `#help`, `#reset`, `#resetall`.
pub struct AdminCommands {
    sigil: String,
    control: Arc<dyn SessionControl>,
    bot: Arc<dyn Bot>,
}

impl AdminCommands {
    pub fn new(sigil: impl Into<String>, control: Arc<dyn SessionControl>, bot: Arc<dyn Bot>) -> Self {
        Self {
            sigil: sigil.into(),
            control,
            bot,
        }
    }

    fn help_text(&self) -> String {
        let s = &self.sigil;
        format!(
            "management commands:\n{s}help - this list\n{s}reset - clear this conversation\n{s}resetall - clear all conversations"
        )
    }
}

#[async_trait]
impl Plugin for AdminCommands {
    fn name(&self) -> &str {
        "admin"
    }

    fn priority(&self) -> i32 {
        100
    }

    async fn on_event(&self, event: Event, ectx: &mut EventContext) {
        if event != Event::HandleContext {
            return;
        }
        let Some(context) = ectx.context.as_ref() else {
            return;
        };
        if context.kind != ContextKind::Text || !context.content.starts_with(&self.sigil) {
            return;
        }

        let command = context.content[self.sigil.len()..].trim().to_string();
        let session_id = context.session_id.clone();
        info!(%session_id, command = command.as_str(), "admin command");

        let reply = match command.as_str() {
            "help" => Reply::info(self.help_text()),
            "reset" => {
                self.control.cancel_session(&session_id);
                match self.bot.reset(&session_id).await {
                    Ok(()) => Reply::info("conversation cleared"),
                    Err(e) => {
                        warn!(error = %e, "bot reset failed");
                        Reply::error("reset failed")
                    }
                }
            }
            "resetall" => {
                self.control.cancel_all_sessions();
                match self.bot.reset_all().await {
                    Ok(()) => Reply::info("all conversations cleared"),
                    Err(e) => {
                        warn!(error = %e, "bot reset_all failed");
                        Reply::error("reset failed")
                    }
                }
            }
            _ => Reply::info(format!("unknown command, {}help for the list", self.sigil)),
        };

        ectx.reply = Some(reply);
        ectx.action = EventAction::BreakPass;
    }
}
