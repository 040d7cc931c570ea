//! Provider change notifications.
//!
//! Providers emit `accountsChanged` and `chainChanged` with loosely typed
//! payloads. They are parsed into [`ProviderEvent`] once, at the boundary,
//! and fanned out to subscribers through an [`EventHub`]. A [`Subscription`]
//! unsubscribes itself when dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::ProviderError;

/// A change notification from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The set of authorized accounts changed. Empty means the wallet locked
    /// or revoked access.
    AccountsChanged { accounts: Vec<String> },
    /// The active chain changed.
    ChainChanged { chain_id: String },
}

impl ProviderEvent {
    pub const ACCOUNTS_CHANGED: &'static str = "accountsChanged";
    pub const CHAIN_CHANGED: &'static str = "chainChanged";

    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderEvent::AccountsChanged { .. } => Self::ACCOUNTS_CHANGED,
            ProviderEvent::ChainChanged { .. } => Self::CHAIN_CHANGED,
        }
    }

    /// Parse a named event with its raw payload.
    pub fn parse(name: &str, payload: &Value) -> Result<Self, ProviderError> {
        match name {
            Self::ACCOUNTS_CHANGED => {
                let accounts = payload
                    .as_array()
                    .ok_or_else(|| {
                        ProviderError::InvalidData(format!(
                            "accountsChanged payload is not an array: {}",
                            payload
                        ))
                    })?
                    .iter()
                    .map(|v| {
                        v.as_str().map(str::to_string).ok_or_else(|| {
                            ProviderError::InvalidData(format!("account is not a string: {}", v))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ProviderEvent::AccountsChanged { accounts })
            }
            Self::CHAIN_CHANGED => {
                let chain_id = payload.as_str().ok_or_else(|| {
                    ProviderError::InvalidData(format!(
                        "chainChanged payload is not a string: {}",
                        payload
                    ))
                })?;
                Ok(ProviderEvent::ChainChanged {
                    chain_id: chain_id.to_string(),
                })
            }
            other => Err(ProviderError::InvalidData(format!(
                "Unknown provider event: {}",
                other
            ))),
        }
    }
}

/// Identifier returned by [`EventHub::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: HashMap<SubscriptionId, mpsc::UnboundedSender<ProviderEvent>>,
}

type SharedHub = Arc<Mutex<HubInner>>;

fn lock(hub: &Mutex<HubInner>) -> MutexGuard<'_, HubInner> {
    hub.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fan-out of provider events to any number of subscribers.
#[derive(Clone, Default)]
pub struct EventHub {
    inner: SharedHub,
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new listener.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = lock(&self.inner);
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.insert(id, tx);
        tracing::debug!("Provider listener {:?} subscribed", id);

        Subscription {
            id,
            rx,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        lock(&self.inner).listeners.remove(&id).is_some()
    }

    /// Remove every listener.
    pub fn remove_all_listeners(&self) {
        let mut inner = lock(&self.inner);
        if !inner.listeners.is_empty() {
            tracing::debug!("Removing {} provider listener(s)", inner.listeners.len());
        }
        inner.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.inner).listeners.len()
    }

    /// Deliver an event to every live listener, pruning closed ones.
    pub fn emit(&self, event: ProviderEvent) {
        let mut inner = lock(&self.inner);
        tracing::debug!(
            "Emitting {} to {} listener(s)",
            event.name(),
            inner.listeners.len()
        );
        inner
            .listeners
            .retain(|_, tx| tx.send(event.clone()).is_ok());
    }

    /// Parse a raw named event and deliver it.
    pub fn emit_raw(&self, name: &str, payload: &Value) -> Result<(), ProviderError> {
        let event = ProviderEvent::parse(name, payload)?;
        self.emit(event);
        Ok(())
    }
}

/// A live registration with an [`EventHub`]. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    rx: mpsc::UnboundedReceiver<ProviderEvent>,
    hub: Weak<Mutex<HubInner>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Wait for the next event. Returns `None` once the listener was removed.
    pub async fn recv(&mut self) -> Option<ProviderEvent> {
        self.rx.recv().await
    }

    /// Non-blocking receive.
    pub fn try_recv(&mut self) -> Option<ProviderEvent> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            lock(&hub).listeners.remove(&self.id);
        }
    }
}
