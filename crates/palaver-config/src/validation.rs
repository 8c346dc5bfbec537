// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as positive pool sizes and a usable admin sigil.

use crate::diagnostic::ConfigError;
use crate::model::PalaverConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PalaverConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.agent.log_level
            ),
        });
    }

    if config.dispatch.concurrency_in_session == 0 {
        errors.push(ConfigError::Validation {
            message: "dispatch.concurrency_in_session must be at least 1".to_string(),
        });
    }

    if config.dispatch.worker_pool_size == 0 {
        errors.push(ConfigError::Validation {
            message: "dispatch.worker_pool_size must be at least 1".to_string(),
        });
    }

    if config.dispatch.poll_interval_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "dispatch.poll_interval_ms must be at least 1".to_string(),
        });
    }

    if config.dispatch.admin_sigil.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "dispatch.admin_sigil must not be empty".to_string(),
        });
    }

    // An empty group prefix would make every group message a trigger,
    // defeating the allow-list design. Empty private prefixes are legal.
    if config
        .trigger
        .group_chat_prefix
        .iter()
        .any(|p| p.is_empty())
    {
        errors.push(ConfigError::Validation {
            message: "trigger.group_chat_prefix entries must not be empty".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&PalaverConfig::default()).is_ok());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let mut config = PalaverConfig::default();
        config.dispatch.concurrency_in_session = 0;
        let errors = validate_config(&config).expect_err("should reject zero concurrency");
        assert!(errors.iter().any(|e| e
            .to_string()
            .contains("concurrency_in_session")));
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let mut config = PalaverConfig::default();
        config.agent.log_level = "verbose".into();
        let errors = validate_config(&config).expect_err("should reject bad level");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn empty_group_prefix_is_rejected() {
        let mut config = PalaverConfig::default();
        config.trigger.group_chat_prefix = vec![String::new()];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn multiple_errors_are_collected() {
        let mut config = PalaverConfig::default();
        config.dispatch.concurrency_in_session = 0;
        config.dispatch.worker_pool_size = 0;
        config.dispatch.admin_sigil = " ".into();
        let errors = validate_config(&config).expect_err("should collect errors");
        assert_eq!(errors.len(), 3);
    }
}
