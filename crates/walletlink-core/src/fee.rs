//! Transaction fee arithmetic.
//!
//! The fee is `gas_price_wei * gas_limit`, computed in 256-bit integers. An
//! `f64` approximation exists only for inputs the exact path cannot handle
//! (e.g. a gas price with more than nine decimals of gwei) and is reported as
//! [`FeeEstimate::Approximate`] so callers can flag it.

use alloy_primitives::U256;
use thiserror::Error;

use crate::units::{format_ether, parse_gwei};

/// Gas limit of a plain value transfer.
pub const DEFAULT_GAS_LIMIT: u64 = 21_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeeError {
    #[error("Invalid gas price: {0}")]
    InvalidGasPrice(String),

    #[error("Invalid gas limit: {0}")]
    InvalidGasLimit(String),
}

/// Result of a fee computation.
#[derive(Debug, Clone, PartialEq)]
pub enum FeeEstimate {
    /// Exact fee in wei.
    Exact { wei: U256, ether: String },
    /// Lower-precision fallback in ether.
    Approximate { ether: f64 },
}

impl FeeEstimate {
    /// Fee in ether as shown to the user.
    pub fn ether(&self) -> String {
        match self {
            FeeEstimate::Exact { ether, .. } => ether.clone(),
            FeeEstimate::Approximate { ether } => format!("{:.8}", ether),
        }
    }

    /// Exact fee in wei, if known.
    pub fn wei(&self) -> Option<U256> {
        match self {
            FeeEstimate::Exact { wei, .. } => Some(*wei),
            FeeEstimate::Approximate { .. } => None,
        }
    }

    pub fn ether_f64(&self) -> f64 {
        match self {
            FeeEstimate::Exact { ether, .. } => ether.parse().unwrap_or(f64::NAN),
            FeeEstimate::Approximate { ether } => *ether,
        }
    }

    /// True for the floating-point fallback.
    pub fn is_degraded(&self) -> bool {
        matches!(self, FeeEstimate::Approximate { .. })
    }
}

fn compute_exact(gas_price_gwei: &str, gas_limit: &str) -> Option<(U256, String)> {
    let price = parse_gwei(gas_price_gwei).ok()?;
    let limit = U256::from_str_radix(gas_limit.trim(), 10).ok()?;
    let wei = price.checked_mul(limit)?;
    let ether = format_ether(wei).ok()?;
    Some((wei, ether))
}

/// Compute `gas_price_gwei * gas_limit` in ether.
pub fn compute_fee(gas_price_gwei: &str, gas_limit: &str) -> Result<FeeEstimate, FeeError> {
    if let Some((wei, ether)) = compute_exact(gas_price_gwei, gas_limit) {
        return Ok(FeeEstimate::Exact { wei, ether });
    }

    let price: f64 = gas_price_gwei
        .trim()
        .parse()
        .map_err(|_| FeeError::InvalidGasPrice(gas_price_gwei.to_string()))?;
    let limit: f64 = gas_limit
        .trim()
        .parse()
        .map_err(|_| FeeError::InvalidGasLimit(gas_limit.to_string()))?;

    if !price.is_finite() || price < 0.0 {
        return Err(FeeError::InvalidGasPrice(gas_price_gwei.to_string()));
    }
    if !limit.is_finite() || limit < 0.0 {
        return Err(FeeError::InvalidGasLimit(gas_limit.to_string()));
    }

    Ok(FeeEstimate::Approximate {
        ether: price * 1e9 * limit / 1e18,
    })
}
