//! Wallet provider integration.
//!
//! - [`Provider`]: the request/event boundary, with [`HttpProvider`] for
//!   JSON-RPC nodes and [`AbsentProvider`] when no wallet is available
//! - [`WalletClient`]: typed RPC calls over a shared provider
//! - [`ConnectionManager`]: connect / disconnect / refresh lifecycle
//! - [`TransferForm`]: fee estimation and value transfers

pub mod client;
pub mod error;
pub mod events;
pub mod http;
pub mod manager;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod provider;
pub mod transfer;

pub use client::*;
pub use error::*;
pub use events::{EventHub, ProviderEvent, Subscription, SubscriptionId};
pub use http::{HttpProvider, WatchHandle};
pub use manager::{ConnectionManager, DEFAULT_REFRESH_INTERVAL, MountGuard};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MOCK_TX_HASH, MockProvider, MockReply};
pub use provider::{AbsentProvider, Provider};
pub use transfer::{FormMountGuard, TransferForm, TransferOptions};

pub use walletlink_core::{validate_address, validate_amount};
