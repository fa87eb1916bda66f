// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recurring dispatch scheduler.
//!
//! One long-lived task scans the registry for due recipients and dispatches
//! to them sequentially, bounding upstream load and keeping retry semantics
//! simple: a recipient whose dispatch fails stays due and is retried on the
//! normal cadence, never via nested retries.
//!
//! The first scan fires a configured delay after startup, not at startup
//! itself. Shutdown cancels future ticks and lets an in-flight tick drain.

pub mod dispatch;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use quizcast_config::model::SchedulerConfig;
use quizcast_core::{ContentSource, Notifier};
use quizcast_registry::RecipientRegistry;

use crate::dispatch::{DispatchOutcome, dispatch_to};

/// Handle to a running scheduler, used for liveness reporting and shutdown.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    token: CancellationToken,
    running: Arc<AtomicBool>,
}

impl SchedulerHandle {
    /// A handle not backed by any task; reports the scheduler as stopped.
    /// Useful for wiring components before the scheduler is spawned.
    pub fn stopped() -> Self {
        Self {
            token: CancellationToken::new(),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether the scheduler task is still alive.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stops future ticks. An in-flight tick completes naturally.
    pub fn shutdown(&self) {
        self.token.cancel();
    }
}

/// The recurring dispatch task.
pub struct DispatchScheduler {
    registry: Arc<RecipientRegistry>,
    source: Arc<dyn ContentSource>,
    notifier: Arc<dyn Notifier>,
    dispatch_interval: chrono::Duration,
    tick_period: Duration,
    first_delay: Duration,
}

impl DispatchScheduler {
    pub fn new(
        config: &SchedulerConfig,
        registry: Arc<RecipientRegistry>,
        source: Arc<dyn ContentSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            registry,
            source,
            notifier,
            dispatch_interval: chrono::Duration::seconds(config.dispatch_interval_secs as i64),
            tick_period: Duration::from_secs(config.tick_period_secs),
            first_delay: Duration::from_secs(config.first_delay_secs),
        }
    }

    /// Spawns the scheduler task and returns its handle.
    pub fn spawn(self) -> SchedulerHandle {
        let token = CancellationToken::new();
        let running = Arc::new(AtomicBool::new(true));
        let handle = SchedulerHandle {
            token: token.clone(),
            running: Arc::clone(&running),
        };

        tokio::spawn(async move {
            info!(
                first_delay_secs = self.first_delay.as_secs(),
                tick_period_secs = self.tick_period.as_secs(),
                "dispatch scheduler started"
            );

            tokio::select! {
                _ = tokio::time::sleep(self.first_delay) => {}
                _ = token.cancelled() => {
                    running.store(false, Ordering::SeqCst);
                    return;
                }
            }

            loop {
                self.tick().await;
                tokio::select! {
                    _ = tokio::time::sleep(self.tick_period) => {}
                    _ = token.cancelled() => break,
                }
            }

            running.store(false, Ordering::SeqCst);
            info!("dispatch scheduler stopped");
        });

        handle
    }

    /// One scan: dispatch sequentially to every due recipient, continuing
    /// past individual failures.
    async fn tick(&self) {
        let now = Utc::now();
        let due = self.registry.snapshot_due(self.dispatch_interval, now);
        if due.is_empty() {
            return;
        }
        debug!(due = due.len(), "scheduler tick");

        for recipient in due {
            match dispatch_to(
                &self.registry,
                self.source.as_ref(),
                self.notifier.as_ref(),
                recipient,
                now,
            )
            .await
            {
                Ok(DispatchOutcome::Sent) => {
                    debug!(chat_id = recipient.0, "scheduled dispatch delivered");
                }
                Ok(DispatchOutcome::Exhausted) => {
                    info!(chat_id = recipient.0, "upstream exhausted, skipping recipient");
                }
                Err(e) => {
                    warn!(
                        chat_id = recipient.0,
                        error = %e,
                        "dispatch failed, recipient stays due"
                    );
                }
            }
        }
    }
}
