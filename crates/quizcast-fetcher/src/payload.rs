// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed decoding and validation of upstream quiz payloads.
//!
//! The upstream `GET {base}/random` endpoint returns either a quiz item or
//! an exhaustion sentinel (an object carrying only a `message` field).
//! Everything is validated here at the fetcher boundary; malformed shapes
//! become upstream failures, never attribute-access surprises downstream.

use serde::Deserialize;
use sha2::{Digest, Sha256};

use quizcast_core::{ContentItem, QuizcastError};

/// Raw upstream payload with every field optional.
///
/// Unknown fields are ignored so upstream can evolve without breaking us.
#[derive(Debug, Deserialize)]
pub struct RawQuizPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Correct answer given as a value that must appear in `options`.
    #[serde(default)]
    pub answer: Option<String>,
    /// Correct answer given as an index into `options`.
    #[serde(default)]
    pub correct_index: Option<usize>,
    #[serde(default)]
    pub explanation: Option<String>,
    /// Exhaustion sentinel: present when no unseen content remains.
    #[serde(default)]
    pub message: Option<String>,
}

/// A validated upstream payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedPayload {
    /// A well-formed quiz item.
    Item(ContentItem),
    /// Upstream signaled content exhaustion.
    Exhausted(String),
}

impl RawQuizPayload {
    /// Validates the raw payload into a [`DecodedPayload`].
    ///
    /// An item must carry a non-empty prompt, at least two options, and a
    /// resolvable correct answer; `answer` values that do not appear in
    /// `options` are rejected. When upstream omits an `id`, a stable dedup
    /// key is derived from the prompt.
    pub fn decode(self) -> Result<DecodedPayload, QuizcastError> {
        let prompt = match self.question {
            Some(q) if !q.trim().is_empty() => q,
            _ => {
                // No question: either the exhaustion sentinel or garbage.
                return match self.message {
                    Some(msg) => Ok(DecodedPayload::Exhausted(msg)),
                    None => Err(QuizcastError::upstream(
                        "payload has neither a question nor an exhaustion message",
                    )),
                };
            }
        };

        let options = self.options.unwrap_or_default();
        if options.len() < 2 {
            return Err(QuizcastError::upstream(format!(
                "item has {} options, need at least 2",
                options.len()
            )));
        }

        let correct_index = match (self.correct_index, self.answer) {
            (Some(index), _) => {
                if index >= options.len() {
                    return Err(QuizcastError::upstream(format!(
                        "correct_index {index} out of range for {} options",
                        options.len()
                    )));
                }
                index
            }
            (None, Some(answer)) => options
                .iter()
                .position(|o| *o == answer)
                .ok_or_else(|| {
                    QuizcastError::upstream(format!("answer `{answer}` not found in options"))
                })?,
            (None, None) => {
                return Err(QuizcastError::upstream(
                    "item carries neither correct_index nor answer",
                ));
            }
        };

        let id = self.id.unwrap_or_else(|| derive_item_id(&prompt));

        Ok(DecodedPayload::Item(ContentItem {
            id,
            prompt,
            options,
            correct_index,
            explanation: self.explanation.filter(|e| !e.trim().is_empty()),
        }))
    }
}

/// Stable dedup key for items whose upstream payload has no `id`.
fn derive_item_id(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    hex::encode(digest)
}
