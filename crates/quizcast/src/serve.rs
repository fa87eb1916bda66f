// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup wiring for `quizcast serve`.
//!
//! Constructs the registry, fetcher, transport, scheduler, update worker,
//! and gateway, then serves until a shutdown signal arrives. The registry
//! is owned here and injected everywhere; nothing holds global state.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use quizcast_commands::CommandHandler;
use quizcast_config::QuizcastConfig;
use quizcast_core::{ContentSource, Notifier, QuizcastError};
use quizcast_fetcher::QuizFetcher;
use quizcast_gateway::GatewayState;
use quizcast_gateway::server::{ServerConfig, start_server};
use quizcast_registry::RecipientRegistry;
use quizcast_scheduler::DispatchScheduler;
use quizcast_telegram::TelegramNotifier;

/// Capacity of the webhook-to-worker queue. Telegram retries dropped
/// updates, so a bounded queue is safe.
const UPDATE_QUEUE_CAPACITY: usize = 256;

pub async fn run(config: QuizcastConfig) -> Result<(), QuizcastError> {
    let registry = Arc::new(RecipientRegistry::new());

    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(&config.telegram)?);
    let source: Arc<dyn ContentSource> =
        Arc::new(QuizFetcher::new(&config.upstream, Arc::clone(&registry))?);

    let commands = Arc::new(CommandHandler::new(
        Arc::clone(&registry),
        Arc::clone(&source),
        Arc::clone(&notifier),
    ));

    let scheduler = DispatchScheduler::new(
        &config.scheduler,
        Arc::clone(&registry),
        Arc::clone(&source),
        Arc::clone(&notifier),
    )
    .spawn();

    // Webhook payloads are acknowledged by the gateway immediately and
    // processed here one at a time, decoupling webhook latency from
    // command execution.
    let (update_tx, mut update_rx) = mpsc::channel::<serde_json::Value>(UPDATE_QUEUE_CAPACITY);
    let worker_commands = Arc::clone(&commands);
    tokio::spawn(async move {
        while let Some(raw) = update_rx.recv().await {
            match quizcast_telegram::update::parse_update(&raw) {
                Ok(Some(command)) => worker_commands.handle_command(command).await,
                Ok(None) => {}
                Err(e) => warn!(error = %e, "dropping malformed update"),
            }
        }
        info!("update worker stopped");
    });

    let state = GatewayState {
        update_tx,
        registry,
        commands,
        source,
        notifier,
        scheduler: scheduler.clone(),
        webhook_url: config.telegram.webhook_url.clone(),
    };

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    info!(service = %config.service.name, "starting quizcast");

    let result = tokio::select! {
        result = start_server(&server_config, state) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            Ok(())
        }
    };

    // Stop future ticks; in-flight work drains or times out naturally.
    scheduler.shutdown();
    result
}
