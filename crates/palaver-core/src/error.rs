// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Palaver gateway.

use thiserror::Error;

/// The primary error type used across all Palaver adapter traits and core operations.
#[derive(Debug, Error)]
pub enum PalaverError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Channel backend errors (transport failure, message format, rate limiting).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// LLM bot errors (API failure, token limits, model not found).
    #[error("bot error: {message}")]
    Bot {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend simply lacks a capability. Retrying cannot help, so the
    /// send path aborts immediately on this variant.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Filesystem errors (media download targets, temp files).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PalaverError {
    /// Shorthand for a channel error without an underlying source.
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a bot error without an underlying source.
    pub fn bot(message: impl Into<String>) -> Self {
        Self::Bot {
            message: message.into(),
            source: None,
        }
    }
}
