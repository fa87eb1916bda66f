// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Quizcast.
//!
//! Serves the inbound webhook and the admin surface. The webhook handler
//! acknowledges immediately and hands the raw payload to the update worker
//! over an mpsc channel, so webhook latency is decoupled from command
//! execution and from any slow outbound send the scheduler may be doing.

pub mod handlers;
pub mod server;

use std::sync::Arc;

use tokio::sync::mpsc;

use quizcast_commands::CommandHandler;
use quizcast_core::{ContentSource, Notifier};
use quizcast_registry::RecipientRegistry;
use quizcast_scheduler::SchedulerHandle;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Raw webhook payloads, consumed sequentially by the update worker.
    pub update_tx: mpsc::Sender<serde_json::Value>,
    /// Recipient registry, read by the listing endpoints.
    pub registry: Arc<RecipientRegistry>,
    /// Command handler backing the admin endpoints.
    pub commands: Arc<CommandHandler>,
    /// Content source, probed by `/ping`.
    pub source: Arc<dyn ContentSource>,
    /// Outbound transport, used by `/set_webhook`.
    pub notifier: Arc<dyn Notifier>,
    /// Scheduler liveness for `/ping`.
    pub scheduler: SchedulerHandle,
    /// Public base URL registered by `/set_webhook`, when configured.
    pub webhook_url: Option<String>,
}
