// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-recipient dispatch routine.
//!
//! Shared between the scheduler's tick loop and the subscribe-time
//! immediate dispatch so both paths have identical semantics: fetch, then
//! notify, then record. `record_dispatch` only happens after a successful
//! delivery, so a failed attempt leaves the recipient due on the next tick.

use chrono::{DateTime, Utc};

use quizcast_core::{ContentSource, FetchOutcome, Notifier, QuizcastError, RecipientId};
use quizcast_registry::RecipientRegistry;

/// Outcome of one dispatch attempt that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A quiz was delivered and the dispatch timestamp recorded.
    Sent,
    /// Upstream is exhausted; nothing was delivered or recorded.
    Exhausted,
}

/// Fetches one item for `recipient` and delivers it.
///
/// Fetch failures and delivery rejections surface as errors for the caller
/// to log; they never advance the recipient's dispatch timestamp.
pub async fn dispatch_to(
    registry: &RecipientRegistry,
    source: &dyn ContentSource,
    notifier: &dyn Notifier,
    recipient: RecipientId,
    now: DateTime<Utc>,
) -> Result<DispatchOutcome, QuizcastError> {
    match source.fetch_for(recipient).await? {
        FetchOutcome::Exhausted => Ok(DispatchOutcome::Exhausted),
        FetchOutcome::Fresh(item) => {
            notifier.send_quiz(recipient, &item).await?;
            registry.record_dispatch(recipient, now);
            Ok(DispatchOutcome::Sent)
        }
    }
}
