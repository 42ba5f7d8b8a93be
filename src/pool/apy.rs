//! Yield model: annualized percentage yield from per-period interest rates
//!
//! Two variants exist. The simple model compounds a per-period rate daily for
//! a year. The auto-stake model additionally folds in the staking rewards the
//! protocol compounds into supplied balances, reconstructed from the two most
//! recent reward/block checkpoints in pool state.
//!
//! Every input that can be absent or degenerate (no interest data, zero
//! supply, equal block checkpoints) resolves to a zero contribution rather
//! than an error: a pool with no data yields nothing, it does not abort the
//! cycle.

use crate::constants::{ BLOCKS_PER_DAY, COMPOUND_PERIODS };
use crate::math::safe_div;
use rust_decimal::{ Decimal, MathematicalOps, RoundingStrategy };

/// Share of borrow interest passed to suppliers (20% reserve factor withheld).
/// The same haircut applies to auto-stake rewards as a performance fee.
fn protocol_share() -> Decimal {
    Decimal::new(8, 1)
}

/// `((1 + i)^365 - 1) * 100`, or None if the power overflows
fn compound(rate: Decimal) -> Option<Decimal> {
    (Decimal::ONE + rate)
        .checked_powu(COMPOUND_PERIODS)
        .map(|c| (c - Decimal::ONE) * Decimal::ONE_HUNDRED)
}

/// Simple compounding APY, rounded to 2 decimal places.
///
/// An absent rate contributes zero yield; it is not an error.
pub fn calc_apy(rate: Option<Decimal>) -> Decimal {
    let Some(i) = rate else {
        return Decimal::ZERO;
    };
    compound(i)
        .map(|apy| apy.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .unwrap_or(Decimal::ZERO)
}

/// Auto-stake-adjusted supply APY.
///
/// Reconstructs the per-block staking reward from two reward checkpoints and
/// two block checkpoints, scales it to a daily fraction of total supply, and
/// compounds it together with the base supply interest. Zero total supply or
/// equal block checkpoints make the staking term zero instead of undefined.
pub fn calc_autostake_apy(
    total_supply: Decimal,
    interest: Decimal,
    pre_last_earned: Decimal,
    last_earned: Decimal,
    pre_last_block: Decimal,
    last_block: Decimal
) -> Decimal {
    let per_block_reward = safe_div(last_earned - pre_last_earned, last_block - pre_last_block);
    let f_staked =
        safe_div(per_block_reward, total_supply) *
        Decimal::from(BLOCKS_PER_DAY) *
        protocol_share();
    compound(f_staked + interest).unwrap_or(Decimal::ZERO)
}

/// Supply-side effective per-period interest: the utilization-weighted share
/// of the token's borrow interest that reaches suppliers.
pub fn supply_interest(token_interest: Decimal, utilization: Decimal) -> Decimal {
    token_interest * utilization * protocol_share()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_calc_apy_absent_rate_is_zero() {
        assert_eq!(calc_apy(None), Decimal::ZERO);
    }

    #[test]
    fn test_calc_apy_zero_rate_is_zero() {
        assert_eq!(calc_apy(Some(Decimal::ZERO)), Decimal::ZERO);
    }

    #[test]
    fn test_calc_apy_known_value() {
        // (1.0001)^365 - 1 = 3.7177% annualized
        assert_eq!(calc_apy(Some(dec("0.0001"))), dec("3.72"));
    }

    #[test]
    fn test_calc_apy_monotonic() {
        let rates = ["0", "0.00001", "0.0001", "0.001", "0.01", "0.05"];
        let mut previous = Decimal::MIN;
        for rate in rates {
            let apy = calc_apy(Some(dec(rate)));
            assert!(apy >= previous, "apy({}) = {} dropped below {}", rate, apy, previous);
            previous = apy;
        }
    }

    #[test]
    fn test_calc_apy_rounds_to_two_places() {
        let apy = calc_apy(Some(dec("0.000137")));
        assert_eq!(apy.scale(), 2);
    }

    #[test]
    fn test_autostake_adds_positive_yield() {
        // per-block reward = (200-100)/(1100-1000) = 1
        // f_staked = 1/100000 * 1440 * 0.8 = 0.01152
        let base = dec("0.0001");
        let autostake = calc_autostake_apy(
            dec("100000"),
            base,
            dec("100"),
            dec("200"),
            dec("1000"),
            dec("1100")
        );
        let simple = calc_apy(Some(base));
        assert!(autostake > simple, "autostake {} should exceed simple {}", autostake, simple);
    }

    #[test]
    fn test_autostake_zero_supply_is_base_only() {
        let base = dec("0.0001");
        let apy = calc_autostake_apy(
            Decimal::ZERO,
            base,
            dec("100"),
            dec("200"),
            dec("1000"),
            dec("1100")
        );
        // staking term collapses to zero, leaving pure base compounding
        assert_eq!(
            apy.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            calc_apy(Some(base))
        );
    }

    #[test]
    fn test_autostake_equal_checkpoints_no_reward() {
        let base = dec("0.0002");
        let apy = calc_autostake_apy(
            dec("100000"),
            base,
            dec("100"),
            dec("200"),
            dec("1000"),
            dec("1000")
        );
        assert_eq!(
            apy.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            calc_apy(Some(base))
        );
    }

    #[test]
    fn test_supply_interest_haircut() {
        // 0.001 * 0.5 utilization * 0.8 = 0.0004
        assert_eq!(supply_interest(dec("0.001"), dec("0.5")), dec("0.0004"));
    }

    #[test]
    fn test_supply_interest_zero_utilization() {
        assert_eq!(supply_interest(dec("0.001"), Decimal::ZERO), Decimal::ZERO);
    }
}
