// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command handling: inbound subscribe/unsubscribe plus the admin
//! broadcast and reset operations.
//!
//! Inbound commands arrive through the webhook worker one at a time; admin
//! operations arrive concurrently from HTTP handlers. Everything here
//! mutates the shared registry through its individually-atomic operations
//! and continues past per-recipient failures within a batch.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use quizcast_core::{ContentSource, InboundCommand, Notifier, QuizcastError, RecipientId};
use quizcast_registry::{RecipientProfile, RecipientRegistry, SubscriptionState};
use quizcast_scheduler::dispatch::{DispatchOutcome, dispatch_to};

const SUBSCRIBE_REPLY: &str =
    "Polls will be sent every hour. Use /stop to stop receiving them.";
const UNSUBSCRIBE_REPLY: &str = "You will no longer receive polls.";
const NOT_SUBSCRIBED_REPLY: &str = "You are not subscribed to polls.";
const UNSUPPORTED_CHAT_REPLY: &str = "This bot doesn't support this type of chat.";

/// Per-run delivery counts reported by broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    pub success: usize,
    pub failed: usize,
}

/// Executes inbound and admin commands against the registry.
pub struct CommandHandler {
    registry: Arc<RecipientRegistry>,
    source: Arc<dyn ContentSource>,
    notifier: Arc<dyn Notifier>,
}

impl CommandHandler {
    pub fn new(
        registry: Arc<RecipientRegistry>,
        source: Arc<dyn ContentSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            registry,
            source,
            notifier,
        }
    }

    /// Executes one parsed inbound command. Reply and dispatch failures are
    /// logged, never propagated: a rejected delivery must not crash the
    /// update worker.
    pub async fn handle_command(&self, command: InboundCommand) {
        match command {
            InboundCommand::Subscribe {
                chat,
                display_name,
                handle,
            } => self.subscribe(chat, display_name, handle).await,
            InboundCommand::Unsubscribe { chat } => self.unsubscribe(chat).await,
            InboundCommand::Unsupported { chat } => {
                self.reply(chat, UNSUPPORTED_CHAT_REPLY).await;
            }
        }
    }

    /// Subscribes a chat and dispatches one item immediately, so the user
    /// sees content right away instead of waiting out the interval.
    ///
    /// Idempotent on the recipient entry; a repeated subscribe resets the
    /// dispatch timestamp and re-dispatches once.
    pub async fn subscribe(
        &self,
        chat: RecipientId,
        display_name: Option<String>,
        handle: Option<String>,
    ) {
        let now = Utc::now();
        self.registry.get_or_create(
            chat,
            RecipientProfile {
                display_name,
                handle,
            },
            now,
        );
        self.registry.set_state(chat, SubscriptionState::Active);
        self.registry.touch(chat, now);
        info!(chat_id = chat.0, "recipient subscribed");

        self.reply(chat, SUBSCRIBE_REPLY).await;

        match dispatch_to(
            &self.registry,
            self.source.as_ref(),
            self.notifier.as_ref(),
            chat,
            now,
        )
        .await
        {
            Ok(DispatchOutcome::Sent) => {
                debug!(chat_id = chat.0, "subscribe-time dispatch delivered");
            }
            Ok(DispatchOutcome::Exhausted) => {
                info!(chat_id = chat.0, "upstream exhausted at subscribe time");
            }
            Err(e) => {
                warn!(chat_id = chat.0, error = %e, "subscribe-time dispatch failed");
            }
        }
    }

    /// Flips a subscribed chat to Dormant; dedup history and profile are
    /// retained so progress survives a later resubscribe.
    pub async fn unsubscribe(&self, chat: RecipientId) {
        match self.registry.state_of(chat) {
            Some(SubscriptionState::Active) => {
                self.registry.set_state(chat, SubscriptionState::Dormant);
                info!(chat_id = chat.0, "recipient unsubscribed");
                self.reply(chat, UNSUBSCRIBE_REPLY).await;
            }
            _ => {
                self.reply(chat, NOT_SUBSCRIBED_REPLY).await;
            }
        }
    }

    /// Sends `message` to one target, or to every known recipient
    /// regardless of subscription state, continuing past failures.
    ///
    /// A non-existent target is not pre-checked; the transport's rejection
    /// shows up in the `failed` count.
    pub async fn broadcast(
        &self,
        message: &str,
        target: Option<RecipientId>,
    ) -> BroadcastReport {
        let targets: Vec<RecipientId> = match target {
            Some(id) => vec![id],
            None => self.registry.list_all().iter().map(|s| s.id).collect(),
        };

        let mut report = BroadcastReport {
            success: 0,
            failed: 0,
        };
        for recipient in targets {
            match self.notifier.send_message(recipient, message).await {
                Ok(()) => report.success += 1,
                Err(e) => {
                    warn!(chat_id = recipient.0, error = %e, "broadcast delivery failed");
                    report.failed += 1;
                }
            }
        }
        info!(
            success = report.success,
            failed = report.failed,
            "broadcast complete"
        );
        report
    }

    /// Clears dedup history for one recipient, or for all when no target is
    /// given. Returns how many recipients were reset.
    pub fn reset_progress(
        &self,
        target: Option<RecipientId>,
    ) -> Result<usize, QuizcastError> {
        match target {
            Some(id) => {
                if self.registry.clear_seen(id) {
                    Ok(1)
                } else {
                    Err(QuizcastError::NotFound {
                        what: format!("recipient {id}"),
                    })
                }
            }
            None => Ok(self.registry.clear_seen_all()),
        }
    }

    async fn reply(&self, chat: RecipientId, text: &str) {
        if let Err(e) = self.notifier.send_message(chat, text).await {
            warn!(chat_id = chat.0, error = %e, "reply delivery failed");
        }
    }
}
