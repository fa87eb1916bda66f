// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram transport adapter for Quizcast.
//!
//! Implements [`Notifier`] via teloxide: a quiz is delivered as an anonymous
//! quiz-type poll followed by the explanation in a MarkdownV2 spoiler, and
//! webhook registration goes through the Bot API `setWebhook` call.

pub mod markdown;
pub mod update;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputPollOption, ParseMode, PollType, Recipient};
use url::Url;
use tracing::warn;

use quizcast_config::model::TelegramConfig;
use quizcast_core::{ContentItem, Notifier, QuizcastError, RecipientId};

/// Outbound Telegram transport implementing [`Notifier`].
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    /// Creates the transport. Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, QuizcastError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            QuizcastError::Config("telegram.bot_token is required to serve".into())
        })?;

        if token.is_empty() {
            return Err(QuizcastError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        Ok(Self {
            bot: Bot::new(token),
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_quiz(
        &self,
        recipient: RecipientId,
        item: &ContentItem,
    ) -> Result<(), QuizcastError> {
        let chat = Recipient::Id(ChatId(recipient.0));

        let correct = u8::try_from(item.correct_index).map_err(|_| {
            QuizcastError::channel(format!(
                "correct_index {} does not fit a poll option id",
                item.correct_index
            ))
        })?;

        let options: Vec<InputPollOption> = item
            .options
            .iter()
            .map(|option| InputPollOption::new(option.clone()))
            .collect();

        self.bot
            .send_poll(chat.clone(), item.prompt.clone(), options)
            .type_(PollType::Quiz)
            .is_anonymous(true)
            .correct_option_id(correct)
            .await
            .map_err(|e| QuizcastError::Channel {
                message: format!("failed to send quiz poll: {e}"),
                source: Some(Box::new(e)),
            })?;

        if let Some(explanation) = &item.explanation {
            let text = format!("Poll Explanation:\n\n{}", markdown::spoiler(explanation));
            let sent = self
                .bot
                .send_message(chat.clone(), text)
                .parse_mode(ParseMode::MarkdownV2)
                .await;

            if let Err(e) = sent {
                // MarkdownV2 is picky; deliver the explanation plain rather
                // than losing it.
                warn!(error = %e, "MarkdownV2 explanation failed, sending as plain text");
                self.bot
                    .send_message(chat, format!("Poll Explanation:\n\n{explanation}"))
                    .await
                    .map_err(|e| QuizcastError::Channel {
                        message: format!("failed to send explanation: {e}"),
                        source: Some(Box::new(e)),
                    })?;
            }
        }

        Ok(())
    }

    async fn send_message(
        &self,
        recipient: RecipientId,
        text: &str,
    ) -> Result<(), QuizcastError> {
        self.bot
            .send_message(Recipient::Id(ChatId(recipient.0)), text)
            .await
            .map_err(|e| QuizcastError::Channel {
                message: format!("failed to send message: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }

    async fn register_webhook(&self, url: &str) -> Result<(), QuizcastError> {
        let url = Url::parse(url).map_err(|e| QuizcastError::Channel {
            message: format!("invalid webhook url `{url}`: {e}"),
            source: Some(Box::new(e)),
        })?;

        self.bot
            .set_webhook(url)
            .await
            .map_err(|e| QuizcastError::Channel {
                message: format!("failed to register webhook: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }
}
