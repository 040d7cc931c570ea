//! Input validation for the transfer form.

use alloy_primitives::Address;

/// Check an address string.
///
/// Accepts `0x` followed by 40 hex digits. All-lowercase and all-uppercase
/// digits are accepted as-is; mixed case must match the EIP-55 checksum.
pub fn validate_address(addr: &str) -> bool {
    let Some(digits) = addr.strip_prefix("0x") else {
        return false;
    };
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(addr, None).is_ok()
    } else {
        addr.parse::<Address>().is_ok()
    }
}

/// Check a transfer amount: numeric, finite and strictly positive.
pub fn validate_amount(amount: &str) -> bool {
    match amount.trim().parse::<f64>() {
        Ok(value) => value.is_finite() && value > 0.0,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // EIP-55 reference vectors.
    const CHECKSUMMED: &[&str] = &[
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn test_checksummed_addresses_are_valid() {
        for addr in CHECKSUMMED {
            assert!(validate_address(addr), "{addr} should be valid");
        }
    }

    #[test]
    fn test_single_case_addresses_are_valid() {
        for addr in CHECKSUMMED {
            let digits = &addr[2..];
            assert!(validate_address(&format!("0x{}", digits.to_lowercase())));
            assert!(validate_address(&format!("0x{}", digits.to_uppercase())));
        }
    }

    #[test]
    fn test_bad_checksum_is_invalid() {
        // First checksummed vector with one letter's case flipped.
        assert!(!validate_address("0x5aaeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
    }

    #[test]
    fn test_malformed_addresses() {
        assert!(!validate_address(""));
        assert!(!validate_address("0x"));
        assert!(!validate_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
        assert!(!validate_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAe"));
        assert!(!validate_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAedd"));
        assert!(!validate_address("0xgggggggggggggggggggggggggggggggggggggggg"));
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("1"));
        assert!(validate_amount("0.001"));
        assert!(validate_amount(" 2.5 "));
        assert!(!validate_amount("0"));
        assert!(!validate_amount("-1"));
        assert!(!validate_amount(""));
        assert!(!validate_amount("abc"));
        assert!(!validate_amount("inf"));
        assert!(!validate_amount("NaN"));
    }

    proptest! {
        #[test]
        fn prop_positive_amounts_are_valid(value in 1e-12f64..1e12) {
            prop_assert!(validate_amount(&value.to_string()));
        }

        #[test]
        fn prop_non_positive_amounts_are_invalid(value in -1e12f64..=0.0) {
            prop_assert!(!validate_amount(&value.to_string()));
        }
    }
}
