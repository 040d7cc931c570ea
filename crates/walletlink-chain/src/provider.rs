//! The wallet provider boundary.
//!
//! A provider answers JSON-RPC style requests (method name plus JSON params)
//! and emits change notifications through its [`EventHub`]. Frontends pass a
//! provider into [`crate::WalletClient`] explicitly; "no wallet installed" is
//! the [`AbsentProvider`] rather than a missing handle.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProviderError;
use crate::events::EventHub;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Send a request and wait for its result.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// Change notifications emitted by this provider.
    fn events(&self) -> &EventHub;

    /// False only for the absent provider.
    fn is_present(&self) -> bool {
        true
    }

    /// Short name for logs and the UI header.
    fn name(&self) -> &str;
}

/// Stand-in for a missing wallet. Every request fails with
/// [`ProviderError::NotInstalled`] and no events are ever emitted.
#[derive(Debug, Default)]
pub struct AbsentProvider {
    events: EventHub,
}

impl AbsentProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Provider for AbsentProvider {
    async fn request(&self, method: &str, _params: Value) -> Result<Value, ProviderError> {
        tracing::debug!("Request {} with no provider installed", method);
        Err(ProviderError::NotInstalled)
    }

    fn events(&self) -> &EventHub {
        &self.events
    }

    fn is_present(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "none"
    }
}
