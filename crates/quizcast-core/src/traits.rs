// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits at the seams of the system.
//!
//! The scheduler and command handler only ever see these traits, never the
//! concrete teloxide or reqwest clients, so both can be exercised with
//! in-memory fakes.

use async_trait::async_trait;

use crate::error::QuizcastError;
use crate::types::{ContentItem, FetchOutcome, RecipientId};

/// Outbound messaging transport.
///
/// Implementations deliver a quiz poll plus its follow-up explanation, or a
/// plain text message. Delivery rejection surfaces as
/// [`QuizcastError::Channel`] and must be handled by the caller without
/// aborting batch processing.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends a quiz poll for `item` followed by its explanation, if any.
    async fn send_quiz(
        &self,
        recipient: RecipientId,
        item: &ContentItem,
    ) -> Result<(), QuizcastError>;

    /// Sends a plain text message.
    async fn send_message(
        &self,
        recipient: RecipientId,
        text: &str,
    ) -> Result<(), QuizcastError>;

    /// Registers `url` as the inbound webhook with the transport.
    async fn register_webhook(&self, url: &str) -> Result<(), QuizcastError> {
        let _ = url;
        Err(QuizcastError::channel(
            "webhook registration not supported by this transport",
        ))
    }
}

/// Content-fetch pipeline.
///
/// `fetch_for` performs the full retry/dedup/exhaustion protocol for one
/// recipient; `check_upstream` is a single cheap reachability probe.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetches one item not yet seen by `recipient`.
    ///
    /// On [`FetchOutcome::Fresh`] the item id has already been recorded in
    /// the recipient's dedup history, atomically with the decision to
    /// return it.
    async fn fetch_for(&self, recipient: RecipientId) -> Result<FetchOutcome, QuizcastError>;

    /// Probes upstream reachability without consuming content or retrying.
    async fn check_upstream(&self) -> Result<(), QuizcastError>;
}
