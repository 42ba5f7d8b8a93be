//! Per-cycle pool stats aggregation
//!
//! Reads a pool's token setup list, on-chain totals, contract-computed rate
//! and interest figures, and price quotes, then combines them into one
//! `PoolTokenStats` record per active token. All reads for one pool are
//! issued concurrently and awaited jointly.
//!
//! Error policy follows the protocol's state conventions: a missing optional
//! value (price list, per-caller balance, any zero-valued key the chain
//! omits) degrades to zero, while a missing token list or falsy
//! `setup_active` flag fails the whole pool for this cycle.

use crate::config::TokenRegistry;
use crate::constants::{ INTEREST_SCALE, PRICE_SCALE, RATE_SCALE, SETUP_SCALE };
use crate::errors::{ BotError, BotResult };
use crate::logger::{ self, LogTag };
use crate::math::{ format_units, parse_raw, safe_div };
use crate::node::{ state_flag, state_string, NodeClient };
use crate::pool::apy::{ calc_apy, calc_autostake_apy, supply_interest };
use crate::pool::types::{ PoolTokenSetup, PoolTokenStats, PriceRange };
use rust_decimal::{ Decimal, RoundingStrategy };
use serde_json::Value;
use std::collections::HashMap;

/// Borrow/supply token rates from calculateTokenRates
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenRates {
    pub borrow_rate: Decimal,
    pub supply_rate: Decimal,
}

/// Raw state slice for one token, as read from the pool's key-value store.
/// Every field is optional: the chain omits zero-valued keys.
#[derive(Debug, Clone, Default)]
pub struct RawTokenState {
    pub total_supplied: Option<String>,
    pub total_borrowed: Option<String>,
    pub self_supplied: Option<String>,
    pub self_borrowed: Option<String>,
    pub max_supply: Option<String>,
    pub autostake_pre_last_earned: Option<String>,
    pub autostake_last_earned: Option<String>,
    pub autostake_pre_last_block: Option<String>,
    pub autostake_last_block: Option<String>,
}

pub struct PoolStateFetcher {
    node: NodeClient,
    registry: TokenRegistry,
    /// Optional caller address for per-account supplied/borrowed stats
    address: Option<String>,
}

impl PoolStateFetcher {
    pub fn new(node: NodeClient, registry: TokenRegistry, address: Option<String>) -> Self {
        Self { node, registry, address }
    }

    /// Read and decode the pool's token setup list.
    /// Fails with `PoolInactive` when the token list is absent or the active
    /// flag is falsy; that pool contributes no candidates this cycle.
    pub async fn fetch_setups(&self, pool: &str) -> BotResult<Vec<PoolTokenSetup>> {
        let setting_keys: Vec<String> = [
            "setup_tokens",
            "setup_ltvs",
            "setup_lts",
            "setup_penalties",
            "setup_interest",
            "setup_active",
        ]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let settings = self.node.data_entries(pool, &setting_keys).await?;
        parse_setups(pool, &settings, &self.registry)
    }

    /// Borrow/supply rate pairs per token, scale 16
    pub async fn token_rates(&self, pool: &str) -> BotResult<Vec<TokenRates>> {
        let value = self.node.evaluate_string(pool, "calculateTokenRates(false)").await?;
        Ok(parse_token_rates(value.as_deref()))
    }

    /// Per-token borrow interest, scale 8
    pub async fn tokens_interest(&self, pool: &str) -> BotResult<Vec<Decimal>> {
        let value = self.node.evaluate_string(pool, "calculateTokensInterest(false)").await?;
        Ok(parse_tokens_interest(value.as_deref()))
    }

    /// Min/max price quotes per token, scale 6. None when the pool reports
    /// no price list.
    pub async fn prices(&self, pool: &str) -> BotResult<Option<Vec<PriceRange>>> {
        let value = self.node.evaluate_string(pool, "getPrices(false)").await?;
        Ok(value.as_deref().map(parse_prices))
    }

    /// Build one stats record per active token in the pool.
    pub async fn fetch_pool_stats(&self, pool: &str) -> BotResult<Vec<PoolTokenStats>> {
        let setups = self.fetch_setups(pool).await?;

        let mut keys = Vec::with_capacity(setups.len() * 9);
        for setup in &setups {
            let asset_id = &setup.token.asset_id;
            keys.push(format!("setup_maxSupply_{}", asset_id));
            keys.push(format!("total_supplied_{}", asset_id));
            keys.push(format!("total_borrowed_{}", asset_id));
            keys.push(format!("autostake_preLastEarned_{}", asset_id));
            keys.push(format!("autostake_lastEarned_{}", asset_id));
            keys.push(format!("autostake_preLastBlock_{}", asset_id));
            keys.push(format!("autostake_lastBlock_{}", asset_id));
            if let Some(address) = &self.address {
                keys.push(format!("{}_supplied_{}", address, asset_id));
                keys.push(format!("{}_borrowed_{}", address, asset_id));
            }
        }

        let (state, rates, prices, interests) = tokio::join!(
            self.node.data_entries(pool, &keys),
            self.token_rates(pool),
            self.prices(pool),
            self.tokens_interest(pool)
        );

        let state = state?;
        let rates = rates?;
        let interests = interests?;
        // Prices are optional display data; a failed quote read must not sink
        // the pool's yield stats
        let prices = match prices {
            Ok(p) => p,
            Err(e) => {
                logger::debug(LogTag::Pool, &format!("{}: price read failed: {}", pool, e));
                None
            }
        };

        let stats = setups
            .into_iter()
            .enumerate()
            .map(|(index, setup)| {
                let raw = extract_raw_token_state(
                    &state,
                    &setup.token.asset_id,
                    self.address.as_deref()
                );
                build_token_stats(
                    setup,
                    raw,
                    rates.get(index).copied().unwrap_or_default(),
                    interests.get(index).copied(),
                    prices
                        .as_ref()
                        .and_then(|p| p.get(index).copied())
                        .unwrap_or_default()
                )
            })
            .collect();

        Ok(stats)
    }
}

/// Decode the comma-joined setup entries into per-token setups.
pub fn parse_setups(
    pool: &str,
    settings: &HashMap<String, Value>,
    registry: &TokenRegistry
) -> BotResult<Vec<PoolTokenSetup>> {
    let tokens = split_record(state_string(settings, "setup_tokens"));
    let active = state_flag(settings, "setup_active");

    let Some(tokens) = tokens else {
        return Err(BotError::PoolInactive { pool: pool.to_string() });
    };
    if !active {
        return Err(BotError::PoolInactive { pool: pool.to_string() });
    }

    let ltvs = split_record(state_string(settings, "setup_ltvs"));
    let lts = split_record(state_string(settings, "setup_lts"));
    let penalties = split_record(state_string(settings, "setup_penalties"));
    let interest = split_record(state_string(settings, "setup_interest"));

    tokens
        .iter()
        .enumerate()
        .map(|(index, asset_id)| {
            let token = registry
                .get(asset_id)
                .cloned()
                .ok_or_else(|| {
                    BotError::Config(format!("unknown asset {} in pool {}", asset_id, pool))
                })?;
            Ok(PoolTokenSetup {
                token,
                cf: setup_fraction(&ltvs, index),
                lt: setup_fraction(&lts, index),
                penalty: setup_fraction(&penalties, index),
                interest: setup_fraction(&interest, index),
            })
        })
        .collect()
}

/// Combine one token's setup, raw state and contract figures into its stats.
pub fn build_token_stats(
    setup: PoolTokenSetup,
    raw: RawTokenState,
    rates: TokenRates,
    token_interest: Option<Decimal>,
    prices: PriceRange
) -> PoolTokenStats {
    let total_supply = parse_raw(raw.total_supplied.as_deref()) * rates.supply_rate;
    let self_supply = parse_raw(raw.self_supplied.as_deref()) * rates.supply_rate;
    let total_borrow = parse_raw(raw.total_borrowed.as_deref()) * rates.borrow_rate;
    let self_borrow = parse_raw(raw.self_borrowed.as_deref()) * rates.borrow_rate;

    let utilization = safe_div(total_borrow, total_supply);
    let interest = token_interest.unwrap_or(Decimal::ZERO);
    let s_interest = supply_interest(interest, utilization);

    // A nonzero last auto-stake block means reward checkpoints exist and the
    // auto-stake model applies to the supply side
    let is_autostake_avl = !parse_raw(raw.autostake_last_block.as_deref()).is_zero();
    let supply_apy = if is_autostake_avl {
        calc_autostake_apy(
            total_supply,
            s_interest,
            parse_raw(raw.autostake_pre_last_earned.as_deref()),
            parse_raw(raw.autostake_last_earned.as_deref()),
            parse_raw(raw.autostake_pre_last_block.as_deref()),
            parse_raw(raw.autostake_last_block.as_deref())
        )
    } else {
        calc_apy(Some(s_interest))
    };

    let round0 = |d: Decimal| d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let supply_limit = format_units(raw.max_supply.as_deref(), setup.token.decimals);

    PoolTokenStats {
        cf: setup.cf,
        lt: setup.lt,
        penalty: setup.penalty,
        interest,
        prices,
        supply_limit,
        daily_income: round0(self_supply * s_interest),
        daily_loan: round0(self_borrow * interest),
        total_supply: round0(total_supply),
        self_supply: round0(self_supply),
        total_borrow: round0(total_borrow),
        self_borrow: round0(self_borrow),
        utilization,
        supply_apy,
        borrow_apy: calc_apy(token_interest),
        is_autostake_avl,
        token: setup.token,
    }
}

fn extract_raw_token_state(
    state: &HashMap<String, Value>,
    asset_id: &str,
    address: Option<&str>
) -> RawTokenState {
    let get = |key: String| state_string(state, &key);
    RawTokenState {
        total_supplied: get(format!("total_supplied_{}", asset_id)),
        total_borrowed: get(format!("total_borrowed_{}", asset_id)),
        self_supplied: address.and_then(|a| get(format!("{}_supplied_{}", a, asset_id))),
        self_borrowed: address.and_then(|a| get(format!("{}_borrowed_{}", a, asset_id))),
        max_supply: get(format!("setup_maxSupply_{}", asset_id)),
        autostake_pre_last_earned: get(format!("autostake_preLastEarned_{}", asset_id)),
        autostake_last_earned: get(format!("autostake_lastEarned_{}", asset_id)),
        autostake_pre_last_block: get(format!("autostake_preLastBlock_{}", asset_id)),
        autostake_last_block: get(format!("autostake_lastBlock_{}", asset_id)),
    }
}

fn split_record(record: Option<String>) -> Option<Vec<String>> {
    record
        .filter(|s| !s.is_empty())
        .map(|s|
            s
                .split(',')
                .map(|part| part.to_string())
                .collect()
        )
}

fn setup_fraction(list: &Option<Vec<String>>, index: usize) -> Decimal {
    list
        .as_ref()
        .and_then(|l| l.get(index))
        .map(|raw| format_units(Some(raw), SETUP_SCALE))
        .unwrap_or(Decimal::ZERO)
}

fn parse_token_rates(value: Option<&str>) -> Vec<TokenRates> {
    let Some(value) = value else {
        return vec![];
    };
    value
        .split(',')
        .filter(|v| !v.is_empty())
        .map(|v| {
            let mut parts = v.split('|');
            TokenRates {
                borrow_rate: format_units(parts.next(), RATE_SCALE),
                supply_rate: format_units(parts.next(), RATE_SCALE),
            }
        })
        .collect()
}

fn parse_tokens_interest(value: Option<&str>) -> Vec<Decimal> {
    let Some(value) = value else {
        return vec![];
    };
    value
        .split(',')
        .filter(|v| !v.is_empty())
        .map(|v| format_units(Some(v), INTEREST_SCALE))
        .collect()
}

fn parse_prices(value: &str) -> Vec<PriceRange> {
    value
        .split('|')
        .filter(|s| !s.is_empty())
        .map(|s| {
            let mut parts = s.split(',');
            PriceRange {
                min: format_units(parts.next(), PRICE_SCALE),
                max: format_units(parts.next(), PRICE_SCALE),
            }
        })
        .collect()
}
