//! Value transfer form.
//!
//! The [`TransferForm`] owns the form inputs and the outcome of the last
//! submission. It reads account, balance and network from the
//! [`ConnectionManager`] and only writes back to hide itself.

use std::sync::{Arc, Weak};
use std::time::Duration;

use alloy_primitives::U256;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use walletlink_core::{
    AppConfig, BALANCE_DISPLAY_DECIMALS, DEFAULT_GAS_LIMIT, FeeError, FeeEstimate,
    TransferFormState, TransferPhase, compute_fee, format_balance, format_gwei, parse_ether,
    parse_gwei, validate_address, validate_amount,
};

use crate::client::{TransactionRequest, WalletClient};
use crate::error::{ProviderError, WalletError};
use crate::manager::ConnectionManager;

/// Tunables for the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOptions {
    /// Used when the provider cannot quote a gas price.
    pub fallback_gas_price_gwei: String,
    /// Used when the provider cannot estimate gas.
    pub default_gas_limit: u64,
    pub receipt_poll_interval: Duration,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            fallback_gas_price_gwei: "20".to_string(),
            default_gas_limit: DEFAULT_GAS_LIMIT,
            receipt_poll_interval: Duration::from_secs(1),
        }
    }
}

impl From<&AppConfig> for TransferOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            fallback_gas_price_gwei: config.fallback_gas_price_gwei.clone(),
            default_gas_limit: config.default_gas_limit,
            receipt_poll_interval: Duration::from_millis(config.receipt_poll_ms),
        }
    }
}

struct FormInner {
    manager: ConnectionManager,
    state: watch::Sender<TransferFormState>,
    options: TransferOptions,
}

/// Transfer form handle. Clones share the same state.
#[derive(Clone)]
pub struct TransferForm {
    inner: Arc<FormInner>,
}

impl std::fmt::Debug for TransferForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferForm")
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}

/// `"20.0"` reads better as `"20"` in an input field.
fn gwei_input(wei: U256) -> Result<String, ProviderError> {
    let gwei = format_gwei(wei)?;
    Ok(match gwei.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => gwei,
    })
}

impl TransferForm {
    pub fn new(manager: ConnectionManager) -> Self {
        Self::with_options(manager, TransferOptions::default())
    }

    pub fn with_options(manager: ConnectionManager, options: TransferOptions) -> Self {
        let initial = TransferFormState {
            gas_limit: options.default_gas_limit.to_string(),
            ..Default::default()
        };
        let (state, _) = watch::channel(initial);
        Self {
            inner: Arc::new(FormInner {
                manager,
                state,
                options,
            }),
        }
    }

    fn client(&self) -> &WalletClient {
        self.inner.manager.client()
    }

    pub fn state(&self) -> TransferFormState {
        self.inner.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<TransferFormState> {
        self.inner.state.subscribe()
    }

    fn edit(&self, f: impl FnOnce(&mut TransferFormState)) {
        self.inner.state.send_modify(|s| {
            f(s);
            s.reset_outcome();
        });
    }

    pub fn set_recipient(&self, recipient: impl Into<String>) {
        let recipient = recipient.into();
        self.edit(|s| s.recipient = recipient);
    }

    pub fn set_amount(&self, amount: impl Into<String>) {
        let amount = amount.into();
        self.edit(|s| s.amount = amount);
    }

    pub fn set_gas_price(&self, gwei: impl Into<String>) {
        let gwei = gwei.into();
        self.edit(|s| s.gas_price_gwei = gwei);
    }

    pub fn set_gas_limit(&self, gas_limit: impl Into<String>) {
        let gas_limit = gas_limit.into();
        self.edit(|s| s.gas_limit = gas_limit);
    }

    pub fn recipient_is_valid(&self) -> bool {
        validate_address(&self.inner.state.borrow().recipient)
    }

    pub fn amount_is_valid(&self) -> bool {
        validate_amount(&self.inner.state.borrow().amount)
    }

    /// Hide the form.
    pub fn close(&self) {
        self.inner.manager.set_send_form_visible(false);
    }

    /// Fill in the gas price quoted by the provider, or the fallback.
    pub async fn estimate_gas_price(&self) {
        if !self.client().is_present() {
            return;
        }

        let gwei = match self.client().gas_price().await.and_then(gwei_input) {
            Ok(gwei) => gwei,
            Err(e) => {
                tracing::warn!(
                    "Gas price estimate failed, using {} gwei: {}",
                    self.inner.options.fallback_gas_price_gwei,
                    e
                );
                self.inner.options.fallback_gas_price_gwei.clone()
            }
        };
        tracing::debug!("Gas price set to {} gwei", gwei);
        self.inner.state.send_modify(|s| s.gas_price_gwei = gwei);
    }

    /// Estimate gas for the current recipient and amount.
    ///
    /// Does nothing until both are filled in. Falls back to the default limit
    /// when the inputs cannot form a transaction or the provider fails. A
    /// result for inputs that changed in the meantime is dropped.
    pub async fn estimate_gas_limit(&self) {
        let (recipient, amount) = {
            let s = self.inner.state.borrow();
            (s.recipient.clone(), s.amount.clone())
        };
        if recipient.trim().is_empty() || amount.trim().is_empty() {
            return;
        }

        let connection = self.inner.manager.state();
        let Some(account) = connection.account.filter(|_| connection.connected) else {
            return;
        };

        let default_limit = self.inner.options.default_gas_limit.to_string();
        let gas_limit = match parse_ether(&amount) {
            Ok(value) if validate_address(&recipient) => {
                let tx = TransactionRequest::transfer(account, recipient.clone(), value);
                match self.client().estimate_gas(&tx).await {
                    Ok(gas) => gas.to_string(),
                    Err(e) => {
                        tracing::warn!("Gas estimate failed, using {}: {}", default_limit, e);
                        default_limit
                    }
                }
            }
            _ => default_limit,
        };

        self.inner.state.send_if_modified(|s| {
            if s.recipient != recipient || s.amount != amount || s.gas_limit == gas_limit {
                return false;
            }
            s.gas_limit = gas_limit;
            true
        });
    }

    /// Fee for the current gas inputs.
    pub fn compute_fee(&self) -> Result<FeeEstimate, FeeError> {
        let s = self.inner.state.borrow();
        compute_fee(&s.gas_price_gwei, &s.gas_limit)
    }

    /// Validate and submit the transfer, then wait for it to be mined.
    ///
    /// Only one submission runs at a time; a concurrent call returns
    /// [`WalletError::Busy`] without touching the provider. The outcome is
    /// recorded in the form state and returned.
    pub async fn send(&self) -> Result<String, WalletError> {
        let mut acquired = false;
        self.inner.state.send_if_modified(|s| {
            if s.processing {
                return false;
            }
            s.processing = true;
            s.phase = TransferPhase::Validating;
            s.error = None;
            s.success = None;
            acquired = true;
            true
        });
        if !acquired {
            return Err(WalletError::Busy);
        }

        let result = self.submit().await;

        self.inner.state.send_modify(|s| {
            s.processing = false;
            match &result {
                Ok(hash) => {
                    s.phase = TransferPhase::Succeeded;
                    s.success = Some(format!("Transaction confirmed: {}", hash));
                    s.last_tx_hash = Some(hash.clone());
                    s.recipient.clear();
                    s.amount.clear();
                }
                Err(e) => {
                    s.phase = TransferPhase::Failed;
                    s.error = Some(e.to_string());
                }
            }
        });

        match &result {
            Ok(_) => self.inner.manager.refresh_balance().await,
            Err(e) => tracing::warn!("Transfer failed: {}", e),
        }
        result
    }

    async fn submit(&self) -> Result<String, WalletError> {
        let client = self.client();
        if !client.is_present() {
            return Err(ProviderError::NotInstalled.into());
        }
        let connection = self.inner.manager.state();
        let account = match (&connection.account, connection.connected) {
            (Some(account), true) => account.clone(),
            _ => return Err(WalletError::NotConnected),
        };
        let form = self.state();

        if !validate_address(&form.recipient) {
            return Err(WalletError::Validation(
                "Invalid recipient address".to_string(),
            ));
        }
        if !validate_amount(&form.amount) {
            return Err(WalletError::Validation(
                "Amount must be a number greater than zero".to_string(),
            ));
        }
        let value = parse_ether(&form.amount).map_err(|e| WalletError::Validation(e.to_string()))?;
        let gas_price = parse_gwei(&form.gas_price_gwei)
            .map_err(|_| WalletError::Validation(format!("Invalid gas price: {}", form.gas_price_gwei)))?;
        let gas_limit = U256::from_str_radix(form.gas_limit.trim(), 10)
            .map_err(|_| WalletError::Validation(format!("Invalid gas limit: {}", form.gas_limit)))?;
        let fee = compute_fee(&form.gas_price_gwei, &form.gas_limit)
            .map_err(|e| WalletError::Validation(e.to_string()))?;

        let balance = connection.balance_wei.unwrap_or(U256::ZERO);
        let fee_wei = gas_price.saturating_mul(gas_limit);
        if value.saturating_add(fee_wei) > balance {
            let symbol = connection.currency_symbol();
            return Err(WalletError::Validation(format!(
                "Insufficient funds: amount {} {} + fee {} {} exceeds balance {} {}",
                form.amount.trim(),
                symbol,
                fee.ether(),
                symbol,
                format_balance(balance, BALANCE_DISPLAY_DECIMALS),
                symbol
            )));
        }

        self.inner
            .state
            .send_modify(|s| s.phase = TransferPhase::Submitting);

        let tx = TransactionRequest::transfer(account, form.recipient.clone(), value)
            .with_gas(gas_limit)
            .with_gas_price(gas_price);
        tracing::info!(
            "Submitting transfer of {} {} to {}",
            form.amount.trim(),
            connection.currency_symbol(),
            form.recipient
        );
        let hash = client.send_transaction(&tx).await?;
        tracing::info!("Transaction submitted: {}", hash);

        let receipt = client
            .wait_for_receipt(&hash, self.inner.options.receipt_poll_interval)
            .await?;
        if !receipt.succeeded() {
            return Err(WalletError::Reverted(hash));
        }
        tracing::info!(
            "Transaction {} mined in block {}",
            hash,
            receipt
                .block_number()
                .map(|b| b.to_string())
                .unwrap_or_else(|| "?".to_string())
        );
        Ok(hash)
    }

    /// Estimate the gas price once, then keep the gas limit estimate in step
    /// with recipient and amount. Dropping the guard stops both.
    pub fn mount(&self) -> FormMountGuard {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let weak: Weak<FormInner> = Arc::downgrade(&self.inner);
        let mut rx = self.inner.state.subscribe();

        let task = tokio::spawn(async move {
            if let Some(inner) = weak.upgrade() {
                let form = TransferForm { inner };
                tokio::select! {
                    _ = cancelled.cancelled() => return,
                    _ = form.estimate_gas_price() => {}
                }
            }

            let mut last = {
                let s = rx.borrow_and_update();
                (s.recipient.clone(), s.amount.clone())
            };
            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
                let current = {
                    let s = rx.borrow_and_update();
                    (s.recipient.clone(), s.amount.clone())
                };
                if current == last {
                    continue;
                }
                last = current;

                let Some(inner) = weak.upgrade() else { break };
                let form = TransferForm { inner };
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = form.estimate_gas_limit() => {}
                }
            }
        });

        FormMountGuard { token, task }
    }
}

/// Live mount of a [`TransferForm`]. See [`TransferForm::mount`].
#[must_use = "dropping the guard stops the form's background estimates"]
#[derive(Debug)]
pub struct FormMountGuard {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl FormMountGuard {
    pub fn unmount(self) {}
}

impl Drop for FormMountGuard {
    fn drop(&mut self) {
        self.token.cancel();
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::mock::{MOCK_TX_HASH, MockProvider, MockReply};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const ACCOUNT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const RECIPIENT: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
    const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

    async fn connected(balance_wei: u128) -> (Arc<MockProvider>, ConnectionManager, TransferForm) {
        let mock = Arc::new(MockProvider::wallet(ACCOUNT, "0x1", U256::from(balance_wei)));
        let manager = ConnectionManager::new(WalletClient::new(mock.clone()));
        manager.connect().await.unwrap();
        let form = TransferForm::new(manager.clone());
        (mock, manager, form)
    }

    fn fill(form: &TransferForm, amount: &str) {
        form.set_recipient(RECIPIENT);
        form.set_amount(amount);
        form.set_gas_price("20");
        form.set_gas_limit("21000");
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_compute_fee_from_state() {
        let (_mock, _manager, form) = connected(ONE_ETHER).await;
        form.set_gas_price("20");
        let fee = form.compute_fee().unwrap();
        assert_eq!(fee.ether(), "0.00042");
        assert!(!fee.is_degraded());
    }

    #[tokio::test]
    async fn test_estimate_gas_price() {
        let (mock, _manager, form) = connected(ONE_ETHER).await;
        form.estimate_gas_price().await;
        assert_eq!(form.state().gas_price_gwei, "20");

        mock.on("eth_gasPrice", json!("0x59682f00"));
        form.estimate_gas_price().await;
        assert_eq!(form.state().gas_price_gwei, "1.5");
    }

    #[tokio::test]
    async fn test_estimate_gas_price_falls_back() {
        let (mock, _manager, form) = connected(ONE_ETHER).await;
        mock.on_error("eth_gasPrice", -32603, "internal error");
        form.estimate_gas_price().await;
        assert_eq!(form.state().gas_price_gwei, "20");
    }

    #[tokio::test]
    async fn test_estimate_gas_limit() {
        let (mock, _manager, form) = connected(ONE_ETHER).await;

        form.estimate_gas_limit().await;
        assert_eq!(mock.call_count("eth_estimateGas"), 0);

        form.set_recipient(RECIPIENT);
        form.set_amount("0.1");
        mock.on("eth_estimateGas", json!("0x5300"));
        form.estimate_gas_limit().await;
        assert_eq!(form.state().gas_limit, "21248");

        let params = mock.last_params("eth_estimateGas").unwrap();
        assert_eq!(params[0]["from"], ACCOUNT);
        assert_eq!(params[0]["to"], RECIPIENT);
        assert_eq!(params[0]["value"], "0x16345785d8a0000");

        mock.on_error("eth_estimateGas", -32000, "execution reverted");
        form.estimate_gas_limit().await;
        assert_eq!(form.state().gas_limit, "21000");
    }

    #[tokio::test]
    async fn test_estimate_gas_limit_with_unusable_inputs_uses_default() {
        let (mock, _manager, form) = connected(ONE_ETHER).await;
        form.set_gas_limit("50000");
        form.set_recipient("0x1234");
        form.set_amount("0.1");
        form.estimate_gas_limit().await;
        assert_eq!(form.state().gas_limit, "21000");
        assert_eq!(mock.call_count("eth_estimateGas"), 0);
    }

    #[tokio::test]
    async fn test_send_success() {
        let (mock, manager, form) = connected(ONE_ETHER).await;
        fill(&form, "0.5");

        let hash = form.send().await.unwrap();
        assert_eq!(hash, MOCK_TX_HASH);

        let state = form.state();
        assert!(!state.processing);
        assert_eq!(state.phase, TransferPhase::Succeeded);
        assert!(state.success.as_deref().unwrap().contains(MOCK_TX_HASH));
        assert_eq!(state.last_tx_hash.as_deref(), Some(MOCK_TX_HASH));
        assert!(state.recipient.is_empty());
        assert!(state.amount.is_empty());
        assert!(state.error.is_none());

        let params = mock.last_params("eth_sendTransaction").unwrap();
        assert_eq!(
            params,
            json!([{
                "from": ACCOUNT,
                "to": RECIPIENT,
                "value": "0x6f05b59d3b20000",
                "gas": "0x5208",
                "gasPrice": "0x4a817c800",
            }])
        );
        assert!(manager.state().connected);
    }

    #[tokio::test]
    async fn test_send_insufficient_funds_never_submits() {
        let (mock, _manager, form) = connected(ONE_ETHER).await;
        fill(&form, "1");

        let err = form.send().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        let message = err.to_string();
        assert!(message.contains("1 ETH"), "{}", message);
        assert!(message.contains("0.00042"), "{}", message);
        assert!(message.contains("1.0000"), "{}", message);
        assert_eq!(mock.call_count("eth_sendTransaction"), 0);

        let state = form.state();
        assert!(!state.processing);
        assert_eq!(state.phase, TransferPhase::Failed);
        assert_eq!(state.error.as_deref(), Some(message.as_str()));
        assert_eq!(state.recipient, RECIPIENT);
    }

    #[tokio::test]
    async fn test_send_exact_balance_is_allowed() {
        let fee = 420_000_000_000_000u128;
        let (_mock, _manager, form) = connected(ONE_ETHER + fee).await;
        fill(&form, "1");
        assert!(form.send().await.is_ok());
    }

    #[tokio::test]
    async fn test_send_validation_errors() {
        let (mock, _manager, form) = connected(ONE_ETHER).await;

        fill(&form, "0.1");
        form.set_recipient("0x5aaeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        let err = form.send().await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid recipient address");

        fill(&form, "0");
        assert_eq!(form.send().await.unwrap_err().kind(), ErrorKind::ValidationFailed);

        fill(&form, "-1");
        assert_eq!(form.send().await.unwrap_err().kind(), ErrorKind::ValidationFailed);

        assert_eq!(mock.call_count("eth_sendTransaction"), 0);
    }

    #[tokio::test]
    async fn test_send_requires_connection() {
        let (mock, manager, form) = connected(ONE_ETHER).await;
        manager.disconnect();
        mock.clear_calls();
        fill(&form, "0.1");

        let err = form.send().await.unwrap_err();
        assert!(matches!(err, WalletError::NotConnected));
        assert_eq!(
            form.state().error.as_deref(),
            Some("Please connect your wallet first")
        );
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_send_without_provider() {
        let manager = ConnectionManager::new(WalletClient::absent());
        let form = TransferForm::new(manager);
        fill(&form, "0.1");
        let err = form.send().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProviderAbsent);
    }

    #[tokio::test]
    async fn test_rejected_send_keeps_inputs_and_message() {
        let (mock, _manager, form) = connected(ONE_ETHER).await;
        mock.on_error(
            "eth_sendTransaction",
            4001,
            "MetaMask Tx Signature: User denied transaction signature.",
        );
        fill(&form, "0.1");

        let err = form.send().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UserRejected);
        let state = form.state();
        assert_eq!(
            state.error.as_deref(),
            Some("MetaMask Tx Signature: User denied transaction signature.")
        );
        assert_eq!(state.amount, "0.1");
        assert!(!state.processing);
    }

    #[tokio::test]
    async fn test_reverted_transaction() {
        let (mock, _manager, form) = connected(ONE_ETHER).await;
        mock.on(
            "eth_getTransactionReceipt",
            json!({"transactionHash": MOCK_TX_HASH, "status": "0x0"}),
        );
        fill(&form, "0.1");
        let err = form.send().await.unwrap_err();
        assert!(matches!(err, WalletError::Reverted(_)));
        assert_eq!(form.state().phase, TransferPhase::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_receipt() {
        let (mock, _manager, form) = connected(ONE_ETHER).await;
        mock.push("eth_getTransactionReceipt", MockReply::Result(json!(null)))
            .push("eth_getTransactionReceipt", MockReply::Result(json!(null)));
        fill(&form, "0.1");

        form.send().await.unwrap();
        assert_eq!(mock.call_count("eth_getTransactionReceipt"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_flight() {
        let (mock, _manager, form) = connected(ONE_ETHER).await;
        mock.reply(
            "eth_sendTransaction",
            MockReply::Delayed(
                Duration::from_secs(10),
                Box::new(MockReply::Result(json!(MOCK_TX_HASH))),
            ),
        );
        fill(&form, "0.1");

        let first = {
            let form = form.clone();
            tokio::spawn(async move { form.send().await })
        };
        settle().await;
        let state = form.state();
        assert!(state.processing);
        assert_eq!(state.phase, TransferPhase::Submitting);

        assert!(matches!(form.send().await, Err(WalletError::Busy)));
        assert_eq!(mock.call_count("eth_sendTransaction"), 1);

        first.await.unwrap().unwrap();
        assert!(!form.state().processing);
    }

    #[tokio::test]
    async fn test_edit_resets_outcome() {
        let (mock, _manager, form) = connected(ONE_ETHER).await;
        mock.on_error("eth_sendTransaction", -32000, "nonce too low");
        fill(&form, "0.1");
        form.send().await.unwrap_err();
        assert_eq!(form.state().phase, TransferPhase::Failed);

        form.set_amount("0.2");
        let state = form.state();
        assert_eq!(state.phase, TransferPhase::Idle);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_close_hides_form() {
        let (_mock, manager, form) = connected(ONE_ETHER).await;
        manager.set_send_form_visible(true);
        form.close();
        assert!(!manager.state().send_form_visible);
    }

    #[tokio::test]
    async fn test_mount_estimates_and_tracks_inputs() {
        let (mock, _manager, form) = connected(ONE_ETHER).await;
        mock.on("eth_gasPrice", json!("0x3b9aca00"));
        mock.on("eth_estimateGas", json!("0x7530"));

        let guard = form.mount();
        let mut rx = form.watch();
        rx.wait_for(|s| s.gas_price_gwei == "1").await.unwrap();

        form.set_recipient(RECIPIENT);
        form.set_amount("0.1");
        rx.wait_for(|s| s.gas_limit == "30000").await.unwrap();

        drop(guard);
        let calls = mock.call_count("eth_estimateGas");
        form.set_amount("0.2");
        settle().await;
        assert_eq!(mock.call_count("eth_estimateGas"), calls);
    }

    #[tokio::test]
    async fn test_mount_without_provider_skips_gas_price() {
        let manager = ConnectionManager::new(WalletClient::absent());
        let form = TransferForm::new(manager);
        let _guard = form.mount();
        settle().await;
        assert_eq!(form.state().gas_price_gwei, "");
    }

    #[test]
    fn test_options_from_config() {
        let config = AppConfig {
            fallback_gas_price_gwei: "3".to_string(),
            default_gas_limit: 30_000,
            receipt_poll_ms: 250,
            ..Default::default()
        };
        let options = TransferOptions::from(&config);
        assert_eq!(options.fallback_gas_price_gwei, "3");
        assert_eq!(options.default_gas_limit, 30_000);
        assert_eq!(options.receipt_poll_interval, Duration::from_millis(250));
    }
}
