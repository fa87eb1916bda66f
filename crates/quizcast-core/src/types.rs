// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Quizcast workspace.

use serde::{Deserialize, Serialize};

/// Opaque, externally assigned identifier for a dispatch recipient.
///
/// For the Telegram channel this is the chat id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RecipientId(pub i64);

impl std::fmt::Display for RecipientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecipientId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// One quiz unit retrieved from the upstream content API.
///
/// Ephemeral: fetched, delivered, discarded. Never stored beyond the
/// per-recipient dedup history, which keeps only the `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    /// Stable identifier used for per-recipient deduplication.
    pub id: String,
    /// Question text.
    pub prompt: String,
    /// Ordered answer options, always at least two.
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct_index: usize,
    /// Optional explanation sent as a follow-up after the poll.
    pub explanation: Option<String>,
}

/// Outcome of a single content fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A genuinely new item for this recipient; its id has already been
    /// recorded into the recipient's dedup history.
    Fresh(ContentItem),
    /// Upstream signaled that no unseen content remains; a best-effort
    /// reset has been triggered. Terminal for this call, not retryable.
    Exhausted,
}

/// Inbound command parsed from a webhook update, executed sequentially
/// by the command worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundCommand {
    /// Subscribe the chat and dispatch one item immediately.
    Subscribe {
        chat: RecipientId,
        display_name: Option<String>,
        handle: Option<String>,
    },
    /// Stop scheduled dispatches; history and profile are retained.
    Unsubscribe { chat: RecipientId },
    /// A command arrived from a chat kind the bot does not support.
    Unsupported { chat: RecipientId },
}

/// Health status reported by the `/ping` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Upstream reachable and scheduler running.
    Ok,
    /// Process healthy but the scheduler is not running.
    Degraded,
}
