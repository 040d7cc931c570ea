//! Minor/major unit conversion.
//!
//! Balances and values travel over RPC as hex-encoded wei. Users read and
//! type ether (10^18 wei) and gas prices in gwei (10^9 wei).

use alloy_primitives::U256;
use alloy_primitives::utils::{UnitsError, format_units, parse_units};
use thiserror::Error;

/// Decimal places shown for balances.
pub const BALANCE_DISPLAY_DECIMALS: usize = 4;

const ETHER_DECIMALS: usize = 18;
const GWEI_DECIMALS: usize = 9;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Negative amount: {0}")]
    Negative(String),

    #[error("Invalid hex quantity: {0}")]
    InvalidQuantity(String),

    #[error(transparent)]
    Units(#[from] UnitsError),
}

fn parse_decimal(amount: &str, unit: &str, decimals: usize) -> Result<U256, ConversionError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(ConversionError::InvalidAmount(amount.to_string()));
    }
    if trimmed.starts_with('-') {
        return Err(ConversionError::Negative(amount.to_string()));
    }
    // Sub-wei precision is rejected rather than truncated.
    if let Some((_, frac)) = trimmed.split_once('.')
        && frac.len() > decimals
    {
        return Err(ConversionError::InvalidAmount(amount.to_string()));
    }
    Ok(parse_units(trimmed, unit)?.get_absolute())
}

/// Parse an ether amount such as `"1.5"` into wei.
pub fn parse_ether(amount: &str) -> Result<U256, ConversionError> {
    parse_decimal(amount, "ether", ETHER_DECIMALS)
}

/// Parse a gwei amount such as `"20"` into wei.
pub fn parse_gwei(amount: &str) -> Result<U256, ConversionError> {
    parse_decimal(amount, "gwei", GWEI_DECIMALS)
}

/// Drop trailing fractional zeros, keeping at least one digit after the point.
fn trim_fraction(formatted: String) -> String {
    let Some((int, frac)) = formatted.split_once('.') else {
        return format!("{}.0", formatted);
    };
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{}.0", int)
    } else {
        format!("{}.{}", int, frac)
    }
}

/// Format wei as ether with no trailing zeros (`"0.00042"`, `"1.0"`).
pub fn format_ether(wei: U256) -> Result<String, ConversionError> {
    Ok(trim_fraction(format_units(wei, "ether")?))
}

/// Format wei as gwei with no trailing zeros (`"20.0"`, `"1.5"`).
pub fn format_gwei(wei: U256) -> Result<String, ConversionError> {
    Ok(trim_fraction(format_units(wei, "gwei")?))
}

/// Format wei as ether rounded half-up to `places` decimals.
///
/// `1_000_000_000_000_000_000` wei with 4 places renders as `"1.0000"`.
pub fn format_balance(wei: U256, places: usize) -> String {
    let places = places.min(ETHER_DECIMALS);
    let dropped = U256::from(10u64).pow(U256::from(ETHER_DECIMALS - places));
    let scaled = wei.saturating_add(dropped / U256::from(2u64)) / dropped;

    if places == 0 {
        return scaled.to_string();
    }

    let unit = U256::from(10u64).pow(U256::from(places));
    let int = scaled / unit;
    let frac = (scaled % unit).to_string();
    format!("{}.{:0>width$}", int, frac, width = places)
}

/// Parse a JSON-RPC hex quantity (`"0x1bc16d674ec80000"`).
pub fn parse_hex_quantity(quantity: &str) -> Result<U256, ConversionError> {
    let digits = quantity
        .strip_prefix("0x")
        .or_else(|| quantity.strip_prefix("0X"))
        .ok_or_else(|| ConversionError::InvalidQuantity(quantity.to_string()))?;
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16)
        .map_err(|_| ConversionError::InvalidQuantity(quantity.to_string()))
}

/// Encode a value as a JSON-RPC hex quantity.
pub fn to_hex_quantity(value: U256) -> String {
    format!("{:#x}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_parse_ether() {
        assert_eq!(parse_ether("1").unwrap(), U256::from(ONE_ETHER));
        assert_eq!(parse_ether("0.5").unwrap(), U256::from(ONE_ETHER / 2));
        assert_eq!(parse_ether(" 2 ").unwrap(), U256::from(2 * ONE_ETHER));
    }

    #[test]
    fn test_parse_ether_rejects_bad_input() {
        assert!(parse_ether("").is_err());
        assert!(parse_ether("abc").is_err());
        assert!(matches!(parse_ether("-1"), Err(ConversionError::Negative(_))));
        // More precision than wei can hold.
        assert!(parse_ether("0.0000000000000000001").is_err());
    }

    #[test]
    fn test_parse_gwei() {
        assert_eq!(parse_gwei("20").unwrap(), U256::from(20_000_000_000u64));
        assert_eq!(parse_gwei("1.5").unwrap(), U256::from(1_500_000_000u64));
    }

    #[test]
    fn test_format_ether_trims_zeros() {
        assert_eq!(format_ether(U256::from(ONE_ETHER)).unwrap(), "1.0");
        assert_eq!(
            format_ether(U256::from(420_000_000_000_000u64)).unwrap(),
            "0.00042"
        );
        assert_eq!(format_ether(U256::ZERO).unwrap(), "0.0");
    }

    #[test]
    fn test_format_gwei() {
        assert_eq!(format_gwei(U256::from(20_000_000_000u64)).unwrap(), "20.0");
        assert_eq!(format_gwei(U256::from(1_500_000_007u64)).unwrap(), "1.500000007");
    }

    #[test]
    fn test_format_balance_four_places() {
        assert_eq!(format_balance(U256::from(ONE_ETHER), 4), "1.0000");
        assert_eq!(format_balance(U256::ZERO, 4), "0.0000");
        assert_eq!(
            format_balance(U256::from(1_234_567_000_000_000_000u128), 4),
            "1.2346"
        );
        assert_eq!(
            format_balance(U256::from(1_234_449_000_000_000_000u128), 4),
            "1.2344"
        );
    }

    #[test]
    fn test_format_balance_rounds_up_into_integer() {
        assert_eq!(
            format_balance(U256::from(999_999_000_000_000_000u128), 4),
            "1.0000"
        );
    }

    #[test]
    fn test_format_balance_zero_places() {
        assert_eq!(format_balance(U256::from(ONE_ETHER + ONE_ETHER / 2), 0), "2");
    }

    #[test]
    fn test_hex_quantity() {
        assert_eq!(
            parse_hex_quantity("0xde0b6b3a7640000").unwrap(),
            U256::from(ONE_ETHER)
        );
        assert_eq!(parse_hex_quantity("0x0").unwrap(), U256::ZERO);
        assert_eq!(parse_hex_quantity("0x").unwrap(), U256::ZERO);
        assert!(parse_hex_quantity("1234").is_err());
        assert!(parse_hex_quantity("0xzz").is_err());
        assert_eq!(to_hex_quantity(U256::from(21_000u64)), "0x5208");
        assert_eq!(to_hex_quantity(U256::ZERO), "0x0");
    }
}
