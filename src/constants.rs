/// Global constants used across the rebalancer
///
/// This module contains protocol-level constants that are not configurable
/// and are used across multiple modules.

// ============================================================================
// PUZZLE LEND PROTOCOL CONSTANTS
// ============================================================================

/// Scale divisor for pool setup entries (cf, lt, penalty, base interest)
pub const SETUP_SCALE: u32 = 8;

/// Scale divisor for token supply/borrow rates from calculateTokenRates
pub const RATE_SCALE: u32 = 16;

/// Scale divisor for per-token interest from calculateTokensInterest
pub const INTEREST_SCALE: u32 = 8;

/// Scale divisor for min/max price quotes from getPrices
pub const PRICE_SCALE: u32 = 6;

/// Blocks per day on Waves (one block per minute)
pub const BLOCKS_PER_DAY: u32 = 60 * 24;

/// Daily compounding periods per year
pub const COMPOUND_PERIODS: u64 = 365;

// ============================================================================
// WAVES TRANSACTION CONSTANTS
// ============================================================================

/// Invoke-script transaction type id
pub const INVOKE_SCRIPT_TX_TYPE: u8 = 16;

/// Default invoke-script fee in wavelets
pub const DEFAULT_INVOKE_FEE: u64 = 500_000;

/// Mainnet chain id
pub const CHAIN_ID: &str = "W";

/// Poll interval when waiting for transaction confirmation (seconds)
pub const TX_POLL_INTERVAL_SECS: u64 = 5;

/// Maximum confirmation polls before the dispatch is considered failed
pub const TX_POLL_MAX_ATTEMPTS: u32 = 60;
