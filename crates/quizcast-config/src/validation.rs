// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses and positive intervals.

use thiserror::Error;

use crate::model::QuizcastConfig;

/// A single configuration validation error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A semantic constraint on a config value was violated.
    #[error("{message}")]
    Validation { message: String },
}

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &QuizcastConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.upstream.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "upstream.base_url must not be empty".to_string(),
        });
    } else if !config.upstream.base_url.starts_with("http://")
        && !config.upstream.base_url.starts_with("https://")
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "upstream.base_url must start with http:// or https://, got `{}`",
                config.upstream.base_url
            ),
        });
    }

    if config.upstream.retry_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "upstream.retry_attempts must be at least 1".to_string(),
        });
    }

    if config.upstream.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "upstream.request_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.scheduler.tick_period_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "scheduler.tick_period_secs must be at least 1".to_string(),
        });
    }

    if config.scheduler.dispatch_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "scheduler.dispatch_interval_secs must be at least 1".to_string(),
        });
    }

    if let Some(token) = &config.telegram.bot_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "telegram.bot_token must not be empty when set".to_string(),
        });
    }

    if let Some(url) = &config.telegram.webhook_url
        && !url.starts_with("https://")
    {
        errors.push(ConfigError::Validation {
            message: format!("telegram.webhook_url must start with https://, got `{url}`"),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
