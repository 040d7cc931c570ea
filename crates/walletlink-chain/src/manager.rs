//! Wallet connection lifecycle.
//!
//! The [`ConnectionManager`] owns the [`ConnectionState`] and publishes every
//! change through a `tokio::sync::watch` channel. Provider events are handled
//! by a task started with [`ConnectionManager::mount`]; a balance poller runs
//! while connected.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use walletlink_core::{
    AppConfig, BALANCE_DISPLAY_DECIMALS, ConnectionState, MAINNET_CHAIN_ID, NetworkState,
    format_balance, get_network_info, mainnet,
};

use crate::client::{AddChainParameters, WalletClient};
use crate::error::{ProviderError, WalletError};
use crate::events::{ProviderEvent, SubscriptionId};

/// Default balance refresh period.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

struct Inner {
    client: WalletClient,
    state: watch::Sender<ConnectionState>,
    refresh_interval: Duration,
    poller: Mutex<Option<JoinHandle<()>>>,
    /// Bumped by every disconnect; a connect that started in an older
    /// session must not publish its result.
    session: AtomicU64,
}

impl Inner {
    fn poller(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.poller.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.poller().take() {
            handle.abort();
        }
    }
}

/// Connection manager handle. Clones share the same state.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("client", &self.inner.client)
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}

impl ConnectionManager {
    pub fn new(client: WalletClient) -> Self {
        Self::with_refresh_interval(client, DEFAULT_REFRESH_INTERVAL)
    }

    pub fn with_refresh_interval(client: WalletClient, refresh_interval: Duration) -> Self {
        let (state, _) = watch::channel(ConnectionState::default());
        Self {
            inner: Arc::new(Inner {
                client,
                state,
                refresh_interval,
                poller: Mutex::new(None),
                session: AtomicU64::new(0),
            }),
        }
    }

    pub fn from_config(client: WalletClient, config: &AppConfig) -> Self {
        Self::with_refresh_interval(client, Duration::from_secs(config.refresh_interval_secs))
    }

    pub fn client(&self) -> &WalletClient {
        &self.inner.client
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ConnectionState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn watch(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.state.borrow().connected
    }

    fn set_error(&self, message: String) {
        self.inner.state.send_modify(|s| {
            s.connecting = false;
            s.error = Some(message);
        });
    }

    /// Reconnect silently if the wallet already authorized this client.
    pub async fn check_existing_connection(&self) {
        let client = &self.inner.client;
        if !client.is_present() {
            self.set_error(ProviderError::NotInstalled.to_string());
            return;
        }

        match client.accounts().await {
            Ok(accounts) if !accounts.is_empty() => {
                tracing::debug!("Found {} authorized account(s)", accounts.len());
                // Failures are already recorded in the state.
                let _ = self.connect().await;
            }
            Ok(_) => tracing::debug!("No previously authorized accounts"),
            Err(e) => tracing::warn!("Failed to check existing connection: {}", e),
        }
    }

    /// Request account access and load account, network and balance.
    ///
    /// On success the whole state is replaced. On failure only `error` is
    /// set; the error is also returned.
    pub async fn connect(&self) -> Result<(), WalletError> {
        let session = self.inner.session.load(Ordering::SeqCst);
        self.inner.state.send_modify(|s| s.connecting = true);

        let result = self.load_connection().await;
        if self.inner.session.load(Ordering::SeqCst) != session {
            tracing::debug!("Discarding connect result, session was reset");
            return result.map(|_| ());
        }

        match result {
            Ok(next) => {
                tracing::info!(
                    "Connected {} on {} (balance {} {})",
                    next.account.as_deref().unwrap_or_default(),
                    next.network.name.as_deref().unwrap_or_default(),
                    next.balance.as_deref().unwrap_or_default(),
                    next.currency_symbol()
                );
                let applied = self.inner.state.send_if_modified(|s| {
                    if self.inner.session.load(Ordering::SeqCst) != session {
                        return false;
                    }
                    let send_form_visible = s.send_form_visible;
                    *s = ConnectionState {
                        send_form_visible,
                        ..next
                    };
                    true
                });
                if applied {
                    self.start_poller(session);
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Connect failed: {}", e);
                self.set_error(e.to_string());
                Err(e)
            }
        }
    }

    async fn load_connection(&self) -> Result<ConnectionState, WalletError> {
        let client = &self.inner.client;
        if !client.is_present() {
            return Err(ProviderError::NotInstalled.into());
        }

        let accounts = client.request_accounts().await?;
        let account = accounts
            .into_iter()
            .next()
            .ok_or_else(|| WalletError::Validation("No accounts authorized".to_string()))?;

        let chain_id = client.chain_id().await?;
        let balance_wei = client.get_balance(&account).await?;

        Ok(ConnectionState {
            connected: true,
            connecting: false,
            account: Some(account),
            balance: Some(format_balance(balance_wei, BALANCE_DISPLAY_DECIMALS)),
            balance_wei: Some(balance_wei),
            network: NetworkState::from(get_network_info(&chain_id)),
            error: None,
            send_form_visible: false,
        })
    }

    /// Forget the session. Does not contact the provider.
    pub fn disconnect(&self) {
        {
            let mut slot = self.inner.poller();
            self.inner.session.fetch_add(1, Ordering::SeqCst);
            if let Some(handle) = slot.take() {
                handle.abort();
                tracing::debug!("Balance poller stopped");
            }
        }
        self.inner.state.send_replace(ConnectionState::default());
        tracing::info!("Disconnected");
    }

    /// Re-read balance and network for the connected account.
    ///
    /// Failures are logged and otherwise ignored. A result that arrives after
    /// the account changed is discarded.
    pub async fn refresh_balance(&self) {
        let account = {
            let state = self.inner.state.borrow();
            if !state.connected {
                return;
            }
            let Some(account) = state.account.clone() else {
                return;
            };
            account
        };

        let client = &self.inner.client;
        let balance_wei = match client.get_balance(&account).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Balance refresh failed: {}", e);
                return;
            }
        };
        let chain_id = match client.chain_id().await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Network refresh failed: {}", e);
                return;
            }
        };

        let applied = self.inner.state.send_if_modified(|s| {
            if !s.connected || s.account.as_deref() != Some(account.as_str()) {
                return false;
            }
            let balance = format_balance(balance_wei, BALANCE_DISPLAY_DECIMALS);
            let network = NetworkState::from(get_network_info(&chain_id));
            let changed = s.balance_wei != Some(balance_wei) || s.network != network;
            s.balance = Some(balance);
            s.balance_wei = Some(balance_wei);
            s.network = network;
            changed
        });
        if applied {
            tracing::debug!("Balance refreshed for {}", account);
        }
    }

    /// Ask the wallet to switch to Ethereum mainnet, registering the chain
    /// first if the wallet does not know it. Failures are logged only.
    pub async fn switch_to_mainnet_chain(&self) {
        if !self.is_connected() {
            tracing::debug!("Ignoring chain switch while disconnected");
            return;
        }

        let client = &self.inner.client;
        match client.switch_chain(MAINNET_CHAIN_ID).await {
            Ok(()) => tracing::info!("Switched to Ethereum Mainnet"),
            Err(e) if e.is_unrecognized_chain() => {
                tracing::info!("Wallet does not know mainnet, adding it");
                let params = AddChainParameters::from(mainnet());
                if let Err(e) = client.add_chain(&params).await {
                    tracing::warn!("Failed to add mainnet: {}", e);
                    return;
                }
                if let Err(e) = client.switch_chain(MAINNET_CHAIN_ID).await {
                    tracing::warn!("Failed to switch to mainnet after adding it: {}", e);
                }
            }
            Err(e) => tracing::warn!("Failed to switch to mainnet: {}", e),
        }
    }

    pub fn set_send_form_visible(&self, visible: bool) {
        self.inner.state.send_if_modified(|s| {
            let changed = s.send_form_visible != visible;
            s.send_form_visible = visible;
            changed
        });
    }

    pub fn toggle_send_form(&self) {
        self.inner
            .state
            .send_modify(|s| s.send_form_visible = !s.send_form_visible);
    }

    async fn handle_event(&self, event: ProviderEvent) {
        tracing::debug!("Provider event: {:?}", event);
        match event {
            ProviderEvent::AccountsChanged { accounts } if accounts.is_empty() => {
                self.disconnect();
            }
            ProviderEvent::AccountsChanged { .. } => {
                let _ = self.connect().await;
            }
            ProviderEvent::ChainChanged { .. } => {
                if self.is_connected() {
                    let _ = self.connect().await;
                }
            }
        }
    }

    /// Subscribe to provider events. Dropping the guard removes the
    /// listener and stops the event task and the balance poller.
    pub fn mount(&self) -> MountGuard {
        let mut subscription = self.inner.client.subscribe();
        let id = subscription.id();
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let weak = Arc::downgrade(&self.inner);

        let task = tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = cancelled.cancelled() => break,
                    event = subscription.recv() => event,
                };
                let Some(event) = event else { break };
                let Some(inner) = weak.upgrade() else { break };
                ConnectionManager { inner }.handle_event(event).await;
            }
            tracing::debug!("Provider event loop stopped");
        });

        MountGuard {
            manager: self.clone(),
            subscription: id,
            token,
            task,
        }
    }

    /// Start the poller unless `session` has been reset since.
    fn start_poller(&self, session: u64) {
        let mut slot = self.inner.poller();
        if self.inner.session.load(Ordering::SeqCst) != session {
            return;
        }
        if slot.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let period = self.inner.refresh_interval;
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        *slot = Some(tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                let manager = ConnectionManager { inner };
                if !manager.is_connected() {
                    break;
                }
                manager.refresh_balance().await;
            }
        }));
        tracing::debug!("Balance poller started ({:?})", period);
    }

    fn stop_poller(&self) {
        if let Some(handle) = self.inner.poller().take() {
            handle.abort();
            tracing::debug!("Balance poller stopped");
        }
    }

    /// Whether the balance poller is currently scheduled.
    pub fn is_polling(&self) -> bool {
        self.inner
            .poller()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

/// Live mount of a [`ConnectionManager`]. See [`ConnectionManager::mount`].
#[must_use = "dropping the guard unmounts the manager"]
pub struct MountGuard {
    manager: ConnectionManager,
    subscription: SubscriptionId,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for MountGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountGuard")
            .field("subscription", &self.subscription)
            .finish()
    }
}

impl MountGuard {
    pub fn unmount(self) {}
}

impl Drop for MountGuard {
    fn drop(&mut self) {
        self.token.cancel();
        self.task.abort();
        self.manager.inner.client.unsubscribe(self.subscription);
        self.manager.stop_poller();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;
    use crate::mock::{MockProvider, MockReply};
    use crate::provider::Provider;
    use alloy_primitives::U256;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const ACCOUNT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

    fn setup(chain_id: &str) -> (Arc<MockProvider>, ConnectionManager) {
        let mock = Arc::new(MockProvider::wallet(ACCOUNT, chain_id, U256::from(ONE_ETHER)));
        let manager = ConnectionManager::new(WalletClient::new(mock.clone()));
        (mock, manager)
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_connect_populates_state() {
        let (_mock, manager) = setup("0xaa36a7");
        manager.connect().await.unwrap();

        let state = manager.state();
        assert!(state.connected);
        assert!(!state.connecting);
        assert_eq!(state.account.as_deref(), Some(ACCOUNT));
        assert_eq!(state.balance.as_deref(), Some("1.0000"));
        assert_eq!(state.balance_wei, Some(U256::from(ONE_ETHER)));
        assert_eq!(state.network.chain_id.as_deref(), Some("0xaa36a7"));
        assert_eq!(state.network.name.as_deref(), Some("Sepolia Testnet"));
        assert!(state.network.is_testnet);
        assert!(state.error.is_none());
        assert!(manager.is_polling());
    }

    #[tokio::test]
    async fn test_connect_without_provider() {
        let manager = ConnectionManager::new(WalletClient::absent());
        let err = manager.connect().await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ProviderAbsent);

        let state = manager.state();
        assert!(!state.connected);
        assert_eq!(state.error.as_deref(), Some("Wallet provider not installed"));
        assert!(!manager.is_polling());
    }

    #[tokio::test]
    async fn test_rejected_connect_keeps_other_fields() {
        let (mock, manager) = setup("0x1");
        manager.connect().await.unwrap();
        let before = manager.state();

        mock.on_error("eth_requestAccounts", codes::USER_REJECTED, "User rejected the request.");
        let err = manager.connect().await.unwrap_err();
        assert!(matches!(err, WalletError::Provider(ref e) if e.is_user_rejection()));

        let after = manager.state();
        assert_eq!(after.error.as_deref(), Some("User rejected the request."));
        assert_eq!(
            ConnectionState {
                error: None,
                ..after
            },
            before
        );
    }

    #[tokio::test]
    async fn test_empty_authorization_is_an_error() {
        let (mock, manager) = setup("0x1");
        mock.on("eth_requestAccounts", json!([]));
        assert!(manager.connect().await.is_err());
        assert!(!manager.state().connected);
        assert!(manager.state().error.is_some());
    }

    #[tokio::test]
    async fn test_disconnect_then_connect_matches_fresh_connect() {
        let (_mock, manager) = setup("0x1");
        manager.connect().await.unwrap();
        manager.disconnect();
        assert_eq!(manager.state(), ConnectionState::default());
        assert!(!manager.is_polling());

        manager.connect().await.unwrap();
        let reconnected = manager.state();

        let (_mock, fresh) = setup("0x1");
        fresh.connect().await.unwrap();
        assert_eq!(reconnected, fresh.state());
    }

    #[tokio::test]
    async fn test_disconnect_does_not_call_provider() {
        let (mock, manager) = setup("0x1");
        manager.connect().await.unwrap();
        mock.clear_calls();
        manager.disconnect();
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_connect_preserves_send_form_visibility() {
        let (_mock, manager) = setup("0x1");
        manager.connect().await.unwrap();
        manager.toggle_send_form();
        manager.connect().await.unwrap();
        assert!(manager.state().send_form_visible);

        manager.set_send_form_visible(false);
        assert!(!manager.state().send_form_visible);
    }

    #[tokio::test]
    async fn test_check_existing_connection() {
        let (mock, manager) = setup("0x1");
        mock.on("eth_accounts", json!([]));
        manager.check_existing_connection().await;
        assert!(!manager.state().connected);
        assert_eq!(mock.call_count("eth_requestAccounts"), 0);

        mock.on("eth_accounts", json!([ACCOUNT]));
        manager.check_existing_connection().await;
        assert!(manager.state().connected);
    }

    #[tokio::test]
    async fn test_check_existing_connection_swallows_errors() {
        let (mock, manager) = setup("0x1");
        mock.on_error("eth_accounts", -32603, "internal error");
        manager.check_existing_connection().await;
        assert_eq!(manager.state(), ConnectionState::default());
    }

    #[tokio::test]
    async fn test_check_existing_connection_without_provider() {
        let manager = ConnectionManager::new(WalletClient::absent());
        manager.check_existing_connection().await;
        assert_eq!(
            manager.state().error.as_deref(),
            Some("Wallet provider not installed")
        );
    }

    #[tokio::test]
    async fn test_refresh_is_noop_when_disconnected() {
        let (mock, manager) = setup("0x1");
        manager.refresh_balance().await;
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_updates_balance_and_swallows_errors() {
        let (mock, manager) = setup("0x1");
        manager.connect().await.unwrap();

        mock.on("eth_getBalance", json!("0x1bc16d674ec80000"));
        manager.refresh_balance().await;
        assert_eq!(manager.state().balance.as_deref(), Some("2.0000"));

        mock.on_error("eth_getBalance", -32000, "header not found");
        manager.refresh_balance().await;
        let state = manager.state();
        assert_eq!(state.balance.as_deref(), Some("2.0000"));
        assert!(state.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_refresh_is_discarded() {
        let (mock, manager) = setup("0x1");
        manager.connect().await.unwrap();

        mock.push(
            "eth_getBalance",
            MockReply::Delayed(
                Duration::from_secs(1),
                Box::new(MockReply::Result(json!("0x1bc16d674ec80000"))),
            ),
        );
        let refreshing = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.refresh_balance().await })
        };
        settle().await;
        manager.disconnect();
        refreshing.await.unwrap();

        assert_eq!(manager.state(), ConnectionState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_refreshes_while_connected() {
        let (mock, manager) = setup("0x1");
        manager.connect().await.unwrap();
        mock.clear_calls();

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(mock.call_count("eth_getBalance"), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(mock.call_count("eth_getBalance"), 1);

        manager.disconnect();
        tokio::time::sleep(Duration::from_secs(120)).await;
        settle().await;
        assert_eq!(mock.call_count("eth_getBalance"), 1);
    }

    #[tokio::test]
    async fn test_switch_to_mainnet_adds_unknown_chain() {
        let (mock, manager) = setup("0x89");
        manager.connect().await.unwrap();

        mock.push(
            "wallet_switchEthereumChain",
            MockReply::error(codes::UNRECOGNIZED_CHAIN, "Unrecognized chain ID"),
        );
        manager.switch_to_mainnet_chain().await;

        assert_eq!(mock.call_count("wallet_switchEthereumChain"), 2);
        assert_eq!(mock.call_count("wallet_addEthereumChain"), 1);
        let params = mock.last_params("wallet_addEthereumChain").unwrap();
        assert_eq!(params[0]["chainId"], "0x1");
        assert_eq!(
            mock.last_params("wallet_switchEthereumChain").unwrap(),
            json!([{ "chainId": "0x1" }])
        );
    }

    #[tokio::test]
    async fn test_switch_to_mainnet_other_errors_are_logged_only() {
        let (mock, manager) = setup("0x89");
        manager.connect().await.unwrap();

        mock.on_error(
            "wallet_switchEthereumChain",
            codes::USER_REJECTED,
            "User rejected the request.",
        );
        manager.switch_to_mainnet_chain().await;
        assert_eq!(mock.call_count("wallet_addEthereumChain"), 0);
        assert!(manager.state().error.is_none());
    }

    #[tokio::test]
    async fn test_switch_is_skipped_when_disconnected() {
        let (mock, manager) = setup("0x89");
        manager.switch_to_mainnet_chain().await;
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_events_drive_state() {
        let (mock, manager) = setup("0x1");
        let guard = manager.mount();
        let mut rx = manager.watch();

        mock.emit(ProviderEvent::AccountsChanged {
            accounts: vec![ACCOUNT.to_string()],
        });
        rx.wait_for(|s| s.connected).await.unwrap();

        mock.on("eth_chainId", json!("0x89"));
        mock.emit(ProviderEvent::ChainChanged {
            chain_id: "0x89".to_string(),
        });
        rx.wait_for(|s| s.network.chain_id.as_deref() == Some("0x89"))
            .await
            .unwrap();
        assert_eq!(manager.state().currency_symbol(), "POL");

        mock.emit(ProviderEvent::AccountsChanged { accounts: vec![] });
        rx.wait_for(|s| !s.connected).await.unwrap();
        assert_eq!(manager.state(), ConnectionState::default());
        assert!(!manager.is_polling());

        drop(guard);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_during_connect_wins() {
        let (mock, manager) = setup("0x1");
        let _guard = manager.mount();
        mock.push(
            "eth_requestAccounts",
            MockReply::Delayed(
                Duration::from_secs(1),
                Box::new(MockReply::Result(json!([ACCOUNT]))),
            ),
        );

        let connecting = tokio::spawn({
            let manager = manager.clone();
            async move { manager.connect().await }
        });
        settle().await;
        assert!(manager.state().connecting);

        mock.emit(ProviderEvent::AccountsChanged { accounts: vec![] });
        settle().await;
        assert_eq!(manager.state(), ConnectionState::default());

        connecting.await.unwrap().unwrap();
        assert_eq!(manager.state(), ConnectionState::default());
        assert!(!manager.is_polling());

        mock.clear_calls();
        tokio::time::sleep(Duration::from_secs(120)).await;
        settle().await;
        assert_eq!(mock.call_count("eth_getBalance"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_connect_after_disconnect_leaves_no_error() {
        let (mock, manager) = setup("0x1");
        mock.push(
            "eth_requestAccounts",
            MockReply::Delayed(
                Duration::from_secs(1),
                Box::new(MockReply::error(codes::USER_REJECTED, "User rejected the request.")),
            ),
        );

        let connecting = tokio::spawn({
            let manager = manager.clone();
            async move { manager.connect().await }
        });
        settle().await;
        manager.disconnect();

        assert!(connecting.await.unwrap().is_err());
        assert_eq!(manager.state(), ConnectionState::default());
    }

    #[tokio::test]
    async fn test_chain_changed_ignored_when_disconnected() {
        let (mock, manager) = setup("0x1");
        let _guard = manager.mount();

        mock.emit(ProviderEvent::ChainChanged {
            chain_id: "0x89".to_string(),
        });
        settle().await;
        assert!(mock.calls().is_empty());
        assert!(!manager.is_connected());
    }

    #[tokio::test]
    async fn test_unmount_removes_listener_and_poller() {
        let (mock, manager) = setup("0x1");
        let guard = manager.mount();
        assert_eq!(mock.events().listener_count(), 1);

        manager.connect().await.unwrap();
        assert!(manager.is_polling());

        guard.unmount();
        assert_eq!(mock.events().listener_count(), 0);
        assert!(!manager.is_polling());

        // Remount does not leak listeners.
        let _guard = manager.mount();
        assert_eq!(mock.events().listener_count(), 1);
    }
}
