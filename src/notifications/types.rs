//! Notification types for Telegram integration

use chrono::{ DateTime, Utc };

/// Types of notifications that can be sent
#[derive(Clone, Debug)]
pub enum NotificationType {
    /// Funds were moved to a more profitable pool
    RebalanceExecuted {
        pool: String,
        tx_url: String,
        previous_apy: String,
        new_apy: String,
    },

    /// Bot startup notification
    BotStarted {
        version: String,
        pools: usize,
    },

    /// System error or warning notification
    SystemError {
        message: String,
    },
}

/// A notification with timestamp
#[derive(Clone, Debug)]
pub struct Notification {
    pub notification_type: NotificationType,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// Create a new notification with current timestamp
    pub fn new(notification_type: NotificationType) -> Self {
        Self {
            notification_type,
            timestamp: Utc::now(),
        }
    }

    pub fn rebalance_executed(
        pool: &str,
        tx_url: &str,
        previous_apy: &str,
        new_apy: &str
    ) -> Self {
        Self::new(NotificationType::RebalanceExecuted {
            pool: pool.to_string(),
            tx_url: tx_url.to_string(),
            previous_apy: previous_apy.to_string(),
            new_apy: new_apy.to_string(),
        })
    }
}
