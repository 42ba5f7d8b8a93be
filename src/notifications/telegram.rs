//! Telegram bot integration
//!
//! Sends operator notifications via the Telegram Bot API using teloxide.
//! Delivery is fire-and-forget from the cycle's perspective: failures are
//! logged as warnings and never retried within the same cycle.

use super::types::{ Notification, NotificationType };
use crate::logger::{ self, LogTag };
use teloxide::prelude::*;
use teloxide::types::{ ChatId, ParseMode };

/// Telegram notifier for sending messages
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    /// Create a new Telegram notifier
    ///
    /// # Arguments
    /// * `bot_token` - Telegram bot token from @BotFather
    /// * `chat_id` - Chat ID to send notifications to
    pub fn new(bot_token: &str, chat_id: i64) -> Result<Self, String> {
        if bot_token.is_empty() {
            return Err("Bot token is empty".to_string());
        }

        let bot = Bot::new(bot_token);

        Ok(Self {
            bot,
            chat_id: ChatId(chat_id),
        })
    }

    /// Send a notification
    pub async fn send(&self, notification: &Notification) -> Result<(), String> {
        let message = self.format_notification(notification);
        self.send_message(&message).await
    }

    /// Send a plain text message
    pub async fn send_message(&self, message: &str) -> Result<(), String> {
        self.bot
            .send_message(self.chat_id, message)
            .parse_mode(ParseMode::Html)
            .send()
            .await
            .map_err(|e| format!("Failed to send Telegram message: {}", e))?;

        logger::debug(
            LogTag::Telegram,
            &format!("Sent Telegram notification (length={})", message.len())
        );

        Ok(())
    }

    /// Format a notification into a Telegram message
    fn format_notification(&self, notification: &Notification) -> String {
        match &notification.notification_type {
            NotificationType::RebalanceExecuted { pool, tx_url, previous_apy, new_apy } => {
                format!(
                    "♻️ <b>The funds were moved to a more profitable pool</b>\n\n\
                     Pool: <code>{}</code>\n\
                     Rebalance TX: {}\n\n\
                     Apy: {}% ➡️ {}%",
                    pool,
                    tx_url,
                    previous_apy,
                    new_apy
                )
            }

            NotificationType::BotStarted { version, pools } => {
                format!(
                    "✅ <b>Rebalancer started</b>\n\n\
                     Version: <code>{}</code>\n\
                     Candidate pools: {}",
                    version,
                    pools
                )
            }

            NotificationType::SystemError { message } => {
                format!("❌ <b>System Error</b>\n\n{}", message)
            }
        }
    }
}
