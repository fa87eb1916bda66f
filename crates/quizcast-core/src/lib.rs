// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Quizcast.
//!
//! Provides the shared error type, common types, and the adapter traits
//! (`Notifier`, `ContentSource`) implemented by the transport and fetcher
//! crates and consumed by the scheduler, command handler, and gateway.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::QuizcastError;
pub use traits::{ContentSource, Notifier};
pub use types::{ContentItem, FetchOutcome, HealthStatus, InboundCommand, RecipientId};
