//! Core state types shared by the connection manager, the transfer form and
//! the frontends.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::fee::DEFAULT_GAS_LIMIT;
use crate::networks::{DEFAULT_CURRENCY_SYMBOL, NetworkInfo};

/// Active network as last reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkState {
    pub chain_id: Option<String>,
    pub name: Option<String>,
    pub is_testnet: bool,
    pub currency_symbol: Option<String>,
}

impl From<NetworkInfo> for NetworkState {
    fn from(info: NetworkInfo) -> Self {
        Self {
            chain_id: Some(info.chain_id),
            name: Some(info.name),
            is_testnet: info.is_testnet,
            currency_symbol: Some(info.currency_symbol),
        }
    }
}

impl NetworkState {
    /// Currency symbol, or the default when unknown.
    pub fn symbol(&self) -> &str {
        self.currency_symbol
            .as_deref()
            .unwrap_or(DEFAULT_CURRENCY_SYMBOL)
    }
}

/// Wallet connection state.
///
/// Balance and network fields are only meaningful while `connected` is true.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionState {
    pub connected: bool,
    /// An authorization request is outstanding.
    pub connecting: bool,
    pub account: Option<String>,
    /// Balance in ether, rounded for display.
    pub balance: Option<String>,
    /// Exact balance the display string was derived from.
    pub balance_wei: Option<U256>,
    pub network: NetworkState,
    pub error: Option<String>,
    pub send_form_visible: bool,
}

impl ConnectionState {
    /// Shortened account for headers (`0x1234...abcd`).
    pub fn short_account(&self) -> Option<String> {
        self.account.as_deref().map(|a| {
            let count = a.chars().count();
            if count > 10 {
                let head: String = a.chars().take(6).collect();
                let tail: String = a.chars().skip(count - 4).collect();
                format!("{}...{}", head, tail)
            } else {
                a.to_string()
            }
        })
    }

    pub fn currency_symbol(&self) -> &str {
        self.network.symbol()
    }
}

/// Lifecycle of a single submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransferPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

impl TransferPhase {
    pub fn label(&self) -> &'static str {
        match self {
            TransferPhase::Idle => "Idle",
            TransferPhase::Validating => "Validating",
            TransferPhase::Submitting => "Submitting",
            TransferPhase::Succeeded => "Succeeded",
            TransferPhase::Failed => "Failed",
        }
    }

    /// A submission is between validation and its outcome.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, TransferPhase::Validating | TransferPhase::Submitting)
    }
}

/// Transfer form inputs and outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferFormState {
    pub recipient: String,
    /// Amount in ether.
    pub amount: String,
    pub gas_price_gwei: String,
    pub gas_limit: String,
    pub processing: bool,
    pub phase: TransferPhase,
    pub error: Option<String>,
    pub success: Option<String>,
    pub last_tx_hash: Option<String>,
}

impl Default for TransferFormState {
    fn default() -> Self {
        Self {
            recipient: String::new(),
            amount: String::new(),
            gas_price_gwei: String::new(),
            gas_limit: DEFAULT_GAS_LIMIT.to_string(),
            processing: false,
            phase: TransferPhase::Idle,
            error: None,
            success: None,
            last_tx_hash: None,
        }
    }
}

impl TransferFormState {
    /// Clear the outcome of the previous submission after an edit.
    pub fn reset_outcome(&mut self) {
        if !self.processing {
            self.phase = TransferPhase::Idle;
            self.error = None;
            self.success = None;
        }
    }
}
