//! Operator notifications over Telegram

pub mod telegram;
pub mod types;

pub use telegram::TelegramNotifier;
pub use types::{ Notification, NotificationType };
