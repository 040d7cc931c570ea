//! Scripted in-memory provider for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use alloy_primitives::U256;
use async_trait::async_trait;
use serde_json::{Value, json};
use walletlink_core::to_hex_quantity;

use crate::error::ProviderError;
use crate::events::{EventHub, ProviderEvent};
use crate::provider::Provider;

/// JSON-RPC "method not found".
const METHOD_NOT_FOUND: i64 = -32601;

/// Hash returned by [`MockProvider::wallet`] for `eth_sendTransaction`.
pub const MOCK_TX_HASH: &str =
    "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

/// A scripted reply.
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    Result(Value),
    Error { code: i64, message: String },
    /// Resolve the inner reply after a delay (use with paused time).
    Delayed(Duration, Box<MockReply>),
}

impl MockReply {
    pub fn error(code: i64, message: impl Into<String>) -> Self {
        MockReply::Error {
            code,
            message: message.into(),
        }
    }
}

#[derive(Default)]
struct MockInner {
    /// One-shot replies consumed before the sticky ones.
    queued: HashMap<String, VecDeque<MockReply>>,
    sticky: HashMap<String, MockReply>,
    calls: Vec<(String, Value)>,
}

#[derive(Default)]
pub struct MockProvider {
    inner: Mutex<MockInner>,
    events: EventHub,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("calls", &self.lock().calls.len())
            .finish()
    }
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A wallet with one unlocked account on the given chain. Gas price is
    /// 20 gwei, gas estimates are 21000 and every transaction is mined
    /// successfully at once.
    pub fn wallet(account: &str, chain_id: &str, balance_wei: U256) -> Self {
        let mock = Self::new();
        mock.on("eth_accounts", json!([account]))
            .on("eth_requestAccounts", json!([account]))
            .on("eth_chainId", json!(chain_id))
            .on("eth_getBalance", json!(to_hex_quantity(balance_wei)))
            .on("eth_gasPrice", json!("0x4a817c800"))
            .on("eth_estimateGas", json!("0x5208"))
            .on("eth_sendTransaction", json!(MOCK_TX_HASH))
            .on(
                "eth_getTransactionReceipt",
                json!({
                    "transactionHash": MOCK_TX_HASH,
                    "blockNumber": "0x1",
                    "gasUsed": "0x5208",
                    "status": "0x1",
                }),
            )
            .on("wallet_switchEthereumChain", Value::Null)
            .on("wallet_addEthereumChain", Value::Null);
        mock
    }

    fn lock(&self) -> MutexGuard<'_, MockInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer every call to `method` with `result`.
    pub fn on(&self, method: &str, result: Value) -> &Self {
        self.reply(method, MockReply::Result(result))
    }

    /// Fail every call to `method` with a provider error.
    pub fn on_error(&self, method: &str, code: i64, message: &str) -> &Self {
        self.reply(method, MockReply::error(code, message))
    }

    pub fn reply(&self, method: &str, reply: MockReply) -> &Self {
        self.lock().sticky.insert(method.to_string(), reply);
        self
    }

    /// Answer the next call to `method` only.
    pub fn push(&self, method: &str, reply: MockReply) -> &Self {
        self.lock()
            .queued
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Drop the scripted reply so the method becomes unknown.
    pub fn forget(&self, method: &str) -> &Self {
        let mut inner = self.lock();
        inner.sticky.remove(method);
        inner.queued.remove(method);
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.lock().calls.iter().filter(|(m, _)| m == method).count()
    }

    /// Params of the most recent call to `method`.
    pub fn last_params(&self, method: &str) -> Option<Value> {
        self.lock()
            .calls
            .iter()
            .rev()
            .find(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn emit(&self, event: ProviderEvent) {
        self.events.emit(event);
    }

    fn next_reply(&self, method: &str, params: Value) -> Option<MockReply> {
        let mut inner = self.lock();
        inner.calls.push((method.to_string(), params));
        if let Some(reply) = inner.queued.get_mut(method).and_then(VecDeque::pop_front) {
            return Some(reply);
        }
        inner.sticky.get(method).cloned()
    }
}

async fn resolve(mut reply: MockReply) -> Result<Value, ProviderError> {
    loop {
        match reply {
            MockReply::Result(value) => return Ok(value),
            MockReply::Error { code, message } => return Err(ProviderError::rpc(code, message)),
            MockReply::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                reply = *inner;
            }
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        match self.next_reply(method, params) {
            Some(reply) => resolve(reply).await,
            None => Err(ProviderError::rpc(
                METHOD_NOT_FOUND,
                format!("the method {} does not exist/is not available", method),
            )),
        }
    }

    fn events(&self) -> &EventHub {
        &self.events
    }

    fn name(&self) -> &str {
        "mock"
    }
}
