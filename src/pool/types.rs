use rust_decimal::Decimal;

/// Immutable asset reference data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub asset_id: String,
    pub symbol: String,
    /// Scale of raw integer amounts for this asset
    pub decimals: u32,
}

/// Min/max price quote for one asset in one pool
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

/// Per-token pool settings, decoded from the comma-joined setup entries
#[derive(Debug, Clone)]
pub struct PoolTokenSetup {
    pub token: Token,
    /// Collateral factor
    pub cf: Decimal,
    /// Liquidation threshold
    pub lt: Decimal,
    pub penalty: Decimal,
    /// Base interest rate
    pub interest: Decimal,
}

/// Per-token pool stats for one decision cycle.
///
/// Constructed fresh from raw reads each cycle and never mutated; lives only
/// until the cycle's decision is made.
#[derive(Debug, Clone)]
pub struct PoolTokenStats {
    pub token: Token,
    pub cf: Decimal,
    pub lt: Decimal,
    pub penalty: Decimal,
    /// Raw per-period borrow interest for this token
    pub interest: Decimal,
    pub prices: PriceRange,
    pub supply_limit: Decimal,
    pub daily_income: Decimal,
    pub daily_loan: Decimal,
    pub total_supply: Decimal,
    pub self_supply: Decimal,
    pub total_borrow: Decimal,
    pub self_borrow: Decimal,
    /// totalBorrow / totalSupply; zero when nothing is supplied
    pub utilization: Decimal,
    pub supply_apy: Decimal,
    pub borrow_apy: Decimal,
    pub is_autostake_avl: bool,
}
