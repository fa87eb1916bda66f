// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./quizcast.toml` > `~/.config/quizcast/quizcast.toml`
//! > `/etc/quizcast/quizcast.toml`, with environment variable overrides via the
//! `QUIZCAST_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::QuizcastConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/quizcast/quizcast.toml` (system-wide)
/// 3. `~/.config/quizcast/quizcast.toml` (user XDG config)
/// 4. `./quizcast.toml` (local directory)
/// 5. `QUIZCAST_*` environment variables
pub fn load_config() -> Result<QuizcastConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuizcastConfig::default()))
        .merge(Toml::file("/etc/quizcast/quizcast.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("quizcast/quizcast.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("quizcast.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<QuizcastConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuizcastConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<QuizcastConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(QuizcastConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `QUIZCAST_TELEGRAM_BOT_TOKEN` must map
/// to `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("QUIZCAST_").map(|key| {
        // `key` is the lowercased env var name with the prefix stripped.
        // Example: QUIZCAST_TELEGRAM_BOT_TOKEN -> "telegram_bot_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("upstream_", "upstream.", 1)
            .replacen("scheduler_", "scheduler.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}
