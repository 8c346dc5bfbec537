// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `palaver serve` command implementation.
//!
//! Wires config, plugins, composer, pipeline, and dispatcher together around
//! the dev loopback backend, then pumps stdin lines through the gateway
//! until EOF or Ctrl-C.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use palaver_channel::{BackendTraits, Composer, Dispatcher, MediaCache, WorkerPipeline};
use palaver_config::PalaverConfig;
use palaver_core::error::PalaverError;
use palaver_core::traits::{ChannelBackend, MessageNormalizer};
use palaver_core::types::{ContextKind, ReplyKind};
use palaver_plugin::{AdminCommands, PluginManager};

use crate::loopback::{EchoBot, LineNormalizer, LoopbackBackend, NoMembers};

/// Runs the `palaver serve` command.
pub async fn run_serve(config: PalaverConfig) -> Result<(), PalaverError> {
    init_tracing(&config.agent.log_level);
    info!("starting palaver serve");

    let bot = Arc::new(EchoBot);
    let backend = Arc::new(LoopbackBackend);
    let dispatcher = Dispatcher::new(config.dispatch.clone());

    let mut plugins = PluginManager::new();
    plugins.register(Arc::new(AdminCommands::new(
        config.dispatch.admin_sigil.as_str(),
        Arc::new(dispatcher.clone()),
        bot.clone(),
    )));
    let plugins = Arc::new(plugins);

    let traits = BackendTraits {
        no_need_prefix: backend.no_need_prefix(),
        supports_voice: backend.supports(ReplyKind::Voice),
    };
    let composer = Arc::new(Composer::new(&config, traits));

    let pipeline = Arc::new(WorkerPipeline::new(
        &config,
        bot,
        backend,
        plugins.clone(),
        composer.clone(),
        Arc::new(NoMembers),
        Arc::new(MediaCache::new()),
    ));
    let loop_handle = dispatcher.startup(pipeline);

    info!(backend = "loopback", "gateway ready, type messages on stdin");
    let stdin_done = pump_stdin(&composer, &plugins, &dispatcher);

    tokio::select! {
        _ = stdin_done => info!("stdin closed, shutting down"),
        _ = tokio::signal::ctrl_c() => info!("interrupt received, shutting down"),
    }

    dispatcher.shutdown();
    let _ = loop_handle.await;
    Ok(())
}

/// Reads stdin line by line, composing and producing a context per line.
async fn pump_stdin(composer: &Composer, plugins: &PluginManager, dispatcher: &Dispatcher) {
    let normalizer = LineNormalizer;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let message = match normalizer.normalize(line) {
                    Ok(m) => m,
                    Err(e) => {
                        warn!(error = %e, "dropping unparseable input");
                        continue;
                    }
                };
                match composer
                    .compose(ContextKind::Text, message.content.clone(), &message, plugins)
                    .await
                {
                    Some(context) => dispatcher.produce(context),
                    None => debug!("input not eligible, dropped"),
                }
            }
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "stdin read failed");
                return;
            }
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("palaver={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
