// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Quizcast configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; only `telegram.bot_token` is required to actually serve.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuizcastConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Telegram bot settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Upstream content API settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Dispatch scheduler cadence settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Admin/webhook HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "quizcast".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot API token. Required for serving.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Public base URL of this service, used by `/set_webhook` to register
    /// `{webhook_url}/webhook` with the Bot API.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// Upstream content API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Base URL of the content API. `GET {base_url}/random` fetches one
    /// item; `POST {base_url}/reset` clears upstream progress.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Fetch attempts before giving up (duplicates count toward this).
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Delay between attempts after a transport failure, in seconds.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            retry_attempts: default_retry_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://aptitude-api.vercel.app".to_string()
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Dispatch scheduler cadence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Minimum interval between dispatches to one recipient, in seconds.
    #[serde(default = "default_dispatch_interval_secs")]
    pub dispatch_interval_secs: u64,

    /// Period between due-recipient scans, in seconds.
    #[serde(default = "default_tick_period_secs")]
    pub tick_period_secs: u64,

    /// Delay before the first scan after startup, in seconds.
    #[serde(default = "default_first_delay_secs")]
    pub first_delay_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            dispatch_interval_secs: default_dispatch_interval_secs(),
            tick_period_secs: default_tick_period_secs(),
            first_delay_secs: default_first_delay_secs(),
        }
    }
}

fn default_dispatch_interval_secs() -> u64 {
    3600
}

fn default_tick_period_secs() -> u64 {
    60
}

fn default_first_delay_secs() -> u64 {
    10
}

/// Admin/webhook HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "0.0.0.0".to_string()
}

fn default_gateway_port() -> u16 {
    2032
}
