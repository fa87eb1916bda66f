// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MarkdownV2 escaping for the Telegram Bot API.
//!
//! Telegram's MarkdownV2 parse mode requires escaping 18 special characters.
//! Quiz explanations are plain prose from the upstream API, so everything is
//! escaped unconditionally before being wrapped in spoiler markers.

/// Characters that must be escaped in MarkdownV2 text.
const SPECIAL_CHARS: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Escapes text for Telegram MarkdownV2 parse mode.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut result = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        if SPECIAL_CHARS.contains(&ch) {
            result.push('\\');
        }
        result.push(ch);
    }
    result
}

/// Wraps `text` in MarkdownV2 spoiler markers, escaping the content.
///
/// The markers themselves must not be escaped, only what they hide.
pub fn spoiler(text: &str) -> String {
    format!("||{}||", escape_markdown_v2(text))
}
