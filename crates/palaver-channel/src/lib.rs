// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The gateway core: context composition, session-keyed bounded-concurrency
//! dispatch, and the reply pipeline.
//!
//! Inbound flow: a normalized [`palaver_core::types::Message`] enters the
//! [`compose::Composer`], which either drops it or produces a routing
//! [`palaver_core::types::Context`]. Contexts go to the
//! [`dispatch::Dispatcher`] via `produce`, whose consume loop schedules them
//! onto the [`pipeline::WorkerPipeline`] under per-session and global
//! concurrency bounds. The pipeline generates a reply, decorates it, and
//! sends it through the active [`palaver_core::traits::ChannelBackend`] with
//! bounded retry.

pub mod compose;
pub mod decorate;
pub mod dispatch;
pub mod media;
pub mod pipeline;
pub mod send;

pub use compose::{BackendTraits, Composer};
pub use dispatch::{ContextHandler, Dispatcher};
pub use media::MediaCache;
pub use pipeline::WorkerPipeline;
pub use send::send_with_retry;
