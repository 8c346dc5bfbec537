// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Palaver integration tests.
//!
//! Provides mock adapters and message fixtures for fast, deterministic,
//! CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockBot`] - Mock LLM bot with pre-configured responses
//! - [`RecordingBackend`] - Channel backend capturing sends, with scriptable failures
//! - [`StaticMemberCache`] - Fixed group-member display-name table
//! - [`fixtures`] - Builders for canonical messages and contexts

pub mod fixtures;
pub mod mock_backend;
pub mod mock_bot;
pub mod mock_cache;

pub use mock_backend::RecordingBackend;
pub use mock_bot::MockBot;
pub use mock_cache::StaticMemberCache;
