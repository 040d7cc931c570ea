//! Typed client over a wallet provider.
//!
//! Wraps the raw request/response protocol with one method per RPC call the
//! application uses, decoding hex quantities into `U256`.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use walletlink_core::{NetworkDescriptor, parse_hex_quantity, to_hex_quantity};

use crate::error::ProviderError;
use crate::events::{Subscription, SubscriptionId};
use crate::provider::{AbsentProvider, Provider};

/// A value transfer as submitted to `eth_sendTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: String,
    pub to: String,
    pub value: U256,
    pub gas: Option<U256>,
    pub gas_price: Option<U256>,
}

impl TransactionRequest {
    pub fn transfer(from: impl Into<String>, to: impl Into<String>, value: U256) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            value,
            gas: None,
            gas_price: None,
        }
    }

    pub fn with_gas(mut self, gas: U256) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn with_gas_price(mut self, gas_price: U256) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    /// JSON object with hex-encoded quantities.
    pub fn to_json(&self) -> Value {
        let mut tx = json!({
            "from": self.from,
            "to": self.to,
            "value": to_hex_quantity(self.value),
        });
        if let Some(gas) = self.gas {
            tx["gas"] = json!(to_hex_quantity(gas));
        }
        if let Some(gas_price) = self.gas_price {
            tx["gasPrice"] = json!(to_hex_quantity(gas_price));
        }
        tx
    }
}

/// Subset of a transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub gas_used: Option<String>,
    /// `0x1` on success, `0x0` on revert. Absent on pre-Byzantium chains.
    #[serde(default)]
    pub status: Option<String>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.as_deref() != Some("0x0")
    }

    pub fn block_number(&self) -> Option<u64> {
        self.block_number
            .as_deref()
            .and_then(|b| parse_hex_quantity(b).ok())
            .map(|n| n.saturating_to::<u64>())
    }
}

/// Currency block of `wallet_addEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Parameters of `wallet_addEthereumChain` (EIP-3085).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParameters {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub block_explorer_urls: Vec<String>,
}

impl From<&NetworkDescriptor> for AddChainParameters {
    fn from(network: &NetworkDescriptor) -> Self {
        let block_explorer_urls = if network.explorer_url.is_empty() {
            Vec::new()
        } else {
            vec![network.explorer_url.to_string()]
        };
        Self {
            chain_id: network.chain_id_hex(),
            chain_name: network.display_name.to_string(),
            native_currency: NativeCurrency {
                name: network.currency_name.to_string(),
                symbol: network.currency_symbol.to_string(),
                decimals: network.decimals,
            },
            rpc_urls: vec![network.rpc_url.to_string()],
            block_explorer_urls,
        }
    }
}

fn decode_quantity(method: &str, value: Value) -> Result<U256, ProviderError> {
    let s = value.as_str().ok_or_else(|| {
        ProviderError::InvalidData(format!("{} returned a non-string result: {}", method, value))
    })?;
    Ok(parse_hex_quantity(s)?)
}

fn decode_string(method: &str, value: Value) -> Result<String, ProviderError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(ProviderError::InvalidData(format!(
            "{} returned a non-string result: {}",
            method, other
        ))),
    }
}

/// Client over the single shared provider handle. Cheap to clone.
#[derive(Clone)]
pub struct WalletClient {
    provider: Arc<dyn Provider>,
}

impl std::fmt::Debug for WalletClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletClient")
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl WalletClient {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    /// Client for a session without any wallet.
    pub fn absent() -> Self {
        Self::new(Arc::new(AbsentProvider::new()))
    }

    pub fn is_present(&self) -> bool {
        self.provider.is_present()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Listen for provider change notifications.
    pub fn subscribe(&self) -> Subscription {
        self.provider.events().subscribe()
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.provider.events().unsubscribe(id)
    }

    /// Remove every listener registered on the provider.
    pub fn remove_all_listeners(&self) {
        self.provider.events().remove_all_listeners();
    }

    pub async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        tracing::trace!("-> {} {}", method, params);
        let result = self.provider.request(method, params).await;
        match &result {
            Ok(value) => tracing::trace!("<- {} {}", method, value),
            Err(e) => tracing::debug!("<- {} failed: {}", method, e),
        }
        result
    }

    async fn request_accounts_with(&self, method: &str) -> Result<Vec<String>, ProviderError> {
        let value = self.request(method, json!([])).await?;
        serde_json::from_value(value).map_err(|e| {
            ProviderError::InvalidData(format!("{} returned malformed accounts: {}", method, e))
        })
    }

    /// Already-authorized accounts, without prompting.
    pub async fn accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.request_accounts_with("eth_accounts").await
    }

    /// Ask the wallet to authorize accounts. May prompt the user.
    pub async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.request_accounts_with("eth_requestAccounts").await
    }

    pub async fn chain_id(&self) -> Result<String, ProviderError> {
        let value = self.request("eth_chainId", json!([])).await?;
        decode_string("eth_chainId", value)
    }

    /// Balance of an account in wei at the latest block.
    pub async fn get_balance(&self, account: &str) -> Result<U256, ProviderError> {
        let value = self
            .request("eth_getBalance", json!([account, "latest"]))
            .await?;
        decode_quantity("eth_getBalance", value)
    }

    /// Suggested gas price in wei.
    pub async fn gas_price(&self) -> Result<U256, ProviderError> {
        let value = self.request("eth_gasPrice", json!([])).await?;
        decode_quantity("eth_gasPrice", value)
    }

    pub async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<U256, ProviderError> {
        let value = self.request("eth_estimateGas", json!([tx.to_json()])).await?;
        decode_quantity("eth_estimateGas", value)
    }

    /// Submit a transaction for signing. Returns its hash.
    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String, ProviderError> {
        let value = self
            .request("eth_sendTransaction", json!([tx.to_json()]))
            .await?;
        decode_string("eth_sendTransaction", value)
    }

    pub async fn get_transaction_receipt(
        &self,
        hash: &str,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        let value = self
            .request("eth_getTransactionReceipt", json!([hash]))
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    /// Poll until the transaction is mined. Never gives up on its own.
    pub async fn wait_for_receipt(
        &self,
        hash: &str,
        poll_interval: Duration,
    ) -> Result<TransactionReceipt, ProviderError> {
        loop {
            if let Some(receipt) = self.get_transaction_receipt(hash).await? {
                return Ok(receipt);
            }
            tracing::trace!("Receipt for {} not available yet", hash);
            tokio::time::sleep(poll_interval).await;
        }
    }

    pub async fn switch_chain(&self, chain_id: &str) -> Result<(), ProviderError> {
        self.request("wallet_switchEthereumChain", json!([{ "chainId": chain_id }]))
            .await?;
        Ok(())
    }

    pub async fn add_chain(&self, params: &AddChainParameters) -> Result<(), ProviderError> {
        self.request("wallet_addEthereumChain", json!([params]))
            .await?;
        Ok(())
    }
}
