pub mod arguments;
pub mod config;
pub mod constants;
pub mod errors;
pub mod logger;
pub mod math;
pub mod node;
pub mod notifications;
pub mod pool;
pub mod rebalance;
pub mod transactions;
pub mod utils;
