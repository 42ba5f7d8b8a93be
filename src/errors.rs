use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")] Config(String),

    #[error("Node error: {0}")] Node(String),

    #[error("Parse error: {0}")] Parse(String),

    #[error("Pool not active: {pool}")] PoolInactive {
        pool: String,
    },

    #[error("Transaction failed: {reason}")] TransactionFailed {
        reason: String,
    },

    #[error("Notification error: {0}")] Notification(String),

    #[error("HTTP error: {0}")] Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")] Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")] Io(#[from] std::io::Error),
}

impl BotError {
    /// Whether the next cycle can reasonably retry after this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            BotError::Node(_) => true,
            BotError::Http(_) => true,
            BotError::TransactionFailed { .. } => true,
            BotError::PoolInactive { .. } => true,
            BotError::Notification(_) => true,
            _ => false,
        }
    }
}

pub type BotResult<T> = Result<T, BotError>;
