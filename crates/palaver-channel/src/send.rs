// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The send path: final plugin hook, then transport delivery with bounded
//! linear-backoff retry.

use std::time::Duration;

use tracing::{debug, error};

use palaver_core::error::PalaverError;
use palaver_core::traits::ChannelBackend;
use palaver_core::types::{Context, Reply};
use palaver_plugin::{Event, EventContext};

use crate::pipeline::WorkerPipeline;

/// Extra attempts after the first failed send.
const SEND_RETRIES: u64 = 2;

impl WorkerPipeline {
    pub(crate) async fn send_reply(
        &self,
        context: &Context,
        reply: Reply,
    ) -> Result<(), PalaverError> {
        let ectx = self
            .plugins
            .emit(Event::SendReply, EventContext::with_reply(context.clone(), reply))
            .await;
        let pass = ectx.is_pass();
        let Some(reply) = ectx.reply else {
            return Ok(());
        };
        if pass {
            debug!("send suppressed by plugin");
            return Ok(());
        }
        send_with_retry(self.backend.as_ref(), &reply, context).await
    }
}

/// Delivers one reply, retrying transient failures up to two more times with
/// a linearly increasing backoff. A missing-capability error aborts
/// immediately since retrying cannot help.
pub async fn send_with_retry(
    backend: &dyn ChannelBackend,
    reply: &Reply,
    context: &Context,
) -> Result<(), PalaverError> {
    let mut attempt: u64 = 0;
    loop {
        match backend.send(reply, context).await {
            Ok(()) => {
                debug!(kind = %reply.kind, receiver = context.receiver.as_str(), "reply sent");
                return Ok(());
            }
            Err(e @ PalaverError::NotSupported(_)) => {
                error!(backend = backend.name(), error = %e, "send not supported, not retrying");
                return Err(e);
            }
            Err(e) => {
                error!(backend = backend.name(), attempt, error = %e, "send failed");
                if attempt >= SEND_RETRIES {
                    return Err(e);
                }
                tokio::time::sleep(Duration::from_secs(3 + 3 * attempt)).await;
                attempt += 1;
            }
        }
    }
}
