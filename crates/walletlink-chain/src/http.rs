//! JSON-RPC 2.0 over HTTP provider.
//!
//! Talks to a node that exposes unlocked accounts (anvil, hardhat, geth
//! `--dev`). The node itself never emits change events, so [`HttpProvider::watch`]
//! polls `eth_accounts` and `eth_chainId` and emits them on change.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use crate::error::{ProviderError, codes};
use crate::events::{EventHub, ProviderEvent};
use crate::provider::Provider;

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

impl RpcResponse {
    fn into_result(self) -> Result<Value, ProviderError> {
        if let Some(err) = self.error {
            return Err(ProviderError::Rpc {
                code: err.code,
                message: err.message,
                data: err.data,
            });
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}

/// Provider backed by a JSON-RPC node.
pub struct HttpProvider {
    url: String,
    http: reqwest::Client,
    next_id: AtomicU64,
    events: EventHub,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider").field("url", &self.url).finish()
    }
}

impl HttpProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    pub fn with_client(url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            http,
            next_id: AtomicU64::new(1),
            events: EventHub::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Forward a call to the node unchanged.
    async fn call(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response: RpcResponse = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response.into_result()
    }

    /// The node serves exactly one chain, so switching only succeeds when
    /// the target already is that chain.
    async fn switch_chain(&self, params: &Value) -> Result<Value, ProviderError> {
        let target = params
            .get(0)
            .and_then(|p| p.get("chainId"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProviderError::InvalidData("wallet_switchEthereumChain needs a chainId".into())
            })?;

        let current = self.call("eth_chainId", json!([])).await?;
        if current.as_str().is_some_and(|c| c.eq_ignore_ascii_case(target)) {
            Ok(Value::Null)
        } else {
            Err(ProviderError::rpc(
                codes::UNRECOGNIZED_CHAIN,
                format!("Unrecognized chain ID \"{}\".", target),
            ))
        }
    }

    /// Start emitting `accountsChanged` / `chainChanged` by polling the node.
    ///
    /// The first poll only records a baseline. Polling stops when the
    /// returned [`WatchHandle`] is dropped or cancelled.
    pub fn watch(self: &Arc<Self>, interval: Duration) -> WatchHandle {
        let token = CancellationToken::new();
        let provider = Arc::clone(self);
        let child = token.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut last_accounts: Option<Vec<String>> = None;
            let mut last_chain: Option<String> = None;

            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                match provider.call("eth_accounts", json!([])).await {
                    Ok(value) => match serde_json::from_value::<Vec<String>>(value) {
                        Ok(accounts) => {
                            if last_accounts.as_ref().is_some_and(|prev| *prev != accounts) {
                                provider.events.emit(ProviderEvent::AccountsChanged {
                                    accounts: accounts.clone(),
                                });
                            }
                            last_accounts = Some(accounts);
                        }
                        Err(e) => tracing::debug!("Watcher got malformed accounts: {}", e),
                    },
                    Err(e) => tracing::debug!("Watcher eth_accounts failed: {}", e),
                }

                match provider.call("eth_chainId", json!([])).await {
                    Ok(Value::String(chain_id)) => {
                        if last_chain.as_ref().is_some_and(|prev| *prev != chain_id) {
                            provider.events.emit(ProviderEvent::ChainChanged {
                                chain_id: chain_id.clone(),
                            });
                        }
                        last_chain = Some(chain_id);
                    }
                    Ok(other) => tracing::debug!("Watcher got malformed chain id: {}", other),
                    Err(e) => tracing::debug!("Watcher eth_chainId failed: {}", e),
                }
            }
            tracing::debug!("Provider watcher for {} stopped", provider.url);
        });

        WatchHandle { token }
    }
}

#[async_trait]
impl Provider for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        match method {
            // Node accounts are unlocked; there is nothing to authorize.
            "eth_requestAccounts" => self.call("eth_accounts", params).await,
            "wallet_switchEthereumChain" => self.switch_chain(&params).await,
            "wallet_addEthereumChain" => Err(ProviderError::rpc(
                codes::UNSUPPORTED_METHOD,
                "wallet_addEthereumChain is not supported by a JSON-RPC node",
            )),
            _ => self.call(method, params).await,
        }
    }

    fn events(&self) -> &EventHub {
        &self.events
    }

    fn name(&self) -> &str {
        "json-rpc"
    }
}

/// Keeps a provider watcher alive. Dropping it stops the watcher.
#[derive(Debug)]
pub struct WatchHandle {
    token: CancellationToken,
}

impl WatchHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
