// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook update parsing.
//!
//! Converts a raw update payload (as delivered to `POST /webhook`) into an
//! [`InboundCommand`] for the command worker. Only `/start` and `/stop`
//! text commands are recognized; everything else is ignored.

use teloxide::types::{ChatKind, Message, PublicChatKind, Update, UpdateKind};

use quizcast_core::{InboundCommand, QuizcastError, RecipientId};

/// Parses a raw webhook payload into a command, if it contains one.
///
/// Returns `Ok(None)` for updates that are well-formed but carry nothing
/// actionable (non-message updates, non-command text, media messages).
/// Malformed payloads are an error for the caller to log; they must never
/// crash the worker.
pub fn parse_update(raw: &serde_json::Value) -> Result<Option<InboundCommand>, QuizcastError> {
    // Teloxide's `Update` deserializer needs borrowed keys, which
    // `serde_json::Value` cannot provide, so parse from a string.
    let update: Update =
        serde_json::from_str(&raw.to_string()).map_err(|e| QuizcastError::Channel {
            message: format!("malformed update payload: {e}"),
            source: Some(Box::new(e)),
        })?;

    let UpdateKind::Message(msg) = update.kind else {
        return Ok(None);
    };
    let Some(text) = msg.text() else {
        return Ok(None);
    };

    let chat = RecipientId(msg.chat.id.0);
    // Commands may arrive as `/start@botname`; the suffix is irrelevant.
    let command = text
        .split_whitespace()
        .next()
        .and_then(|t| t.split('@').next())
        .unwrap_or("");

    match command {
        "/start" => {
            if is_supported_chat(&msg) {
                let (display_name, handle) = profile_of(&msg);
                Ok(Some(InboundCommand::Subscribe {
                    chat,
                    display_name,
                    handle,
                }))
            } else {
                Ok(Some(InboundCommand::Unsupported { chat }))
            }
        }
        "/stop" => Ok(Some(InboundCommand::Unsubscribe { chat })),
        _ => Ok(None),
    }
}

/// Private chats, groups, and supergroups receive polls; channels do not.
fn is_supported_chat(msg: &Message) -> bool {
    match &msg.chat.kind {
        ChatKind::Private(_) => true,
        ChatKind::Public(public) => !matches!(public.kind, PublicChatKind::Channel(_)),
    }
}

/// Descriptive profile fields: sender name/username for private chats,
/// chat title for groups.
fn profile_of(msg: &Message) -> (Option<String>, Option<String>) {
    if let Some(user) = msg.from.as_ref() {
        let display_name = Some(user.full_name()).filter(|n| !n.is_empty());
        return (display_name, user.username.clone());
    }
    (msg.chat.title().map(str::to_string), None)
}
