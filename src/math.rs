//! Exact decimal helpers for raw on-chain values
//!
//! Every on-chain amount is an integer scaled by a protocol decimal exponent.
//! All arithmetic on those values goes through `rust_decimal::Decimal` so that
//! compounding over 365 periods stays exact; f64 is never used in the yield
//! path. Absent state keys mean zero on Waves, so every conversion here maps
//! missing or empty input to zero instead of failing.

use rust_decimal::Decimal;

/// Converts a raw integer-as-string into a decimal scaled down by 10^decimals.
///
/// Absent, empty or unparsable input yields zero: the chain omits zero-valued
/// keys, so "no entry" and "zero" are the same observation.
pub fn format_units(raw: Option<&str>, decimals: u32) -> Decimal {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s.trim(),
        _ => {
            return Decimal::ZERO;
        }
    };
    raw.parse::<i128>()
        .ok()
        .and_then(|v| Decimal::try_from_i128_with_scale(v, decimals).ok())
        .unwrap_or(Decimal::ZERO)
}

/// Parses a raw integer-as-string as an unscaled decimal, zero when absent.
pub fn parse_raw(raw: Option<&str>) -> Decimal {
    format_units(raw, 0)
}

/// Division with an explicit zero-denominator policy: an undefined ratio is
/// treated as zero so it never poisons a downstream yield figure.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::MathematicalOps;
    use std::str::FromStr;

    #[test]
    fn test_format_units_scales_down() {
        assert_eq!(format_units(Some("1500000"), 6), Decimal::from_str("1.5").unwrap());
        assert_eq!(format_units(Some("1"), 8), Decimal::from_str("0.00000001").unwrap());
    }

    #[test]
    fn test_format_units_round_trips() {
        for raw in ["0", "1", "42", "100000000", "987654321012345"] {
            for decimals in [0u32, 2, 6, 8, 16] {
                let scaled = format_units(Some(raw), decimals);
                let back = scaled * Decimal::from(10u64).powi(decimals as i64);
                assert_eq!(back.normalize(), Decimal::from_str(raw).unwrap().normalize());
            }
        }
    }

    #[test]
    fn test_format_units_absent_is_zero() {
        assert_eq!(format_units(None, 6), Decimal::ZERO);
        assert_eq!(format_units(Some(""), 6), Decimal::ZERO);
        assert_eq!(format_units(Some("   "), 6), Decimal::ZERO);
        assert_eq!(format_units(Some("not-a-number"), 6), Decimal::ZERO);
    }

    #[test]
    fn test_safe_div_zero_denominator() {
        assert_eq!(safe_div(Decimal::ONE, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(safe_div(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_safe_div_regular() {
        assert_eq!(
            safe_div(Decimal::from(3), Decimal::from(4)),
            Decimal::from_str("0.75").unwrap()
        );
    }
}
