//! Error types for provider operations.

use serde_json::Value;
use thiserror::Error;

/// EIP-1193 / EIP-3326 provider error codes.
pub mod codes {
    /// The user rejected the request.
    pub const USER_REJECTED: i64 = 4001;
    /// The requested method or account has not been authorized.
    pub const UNAUTHORIZED: i64 = 4100;
    /// The provider does not support the method.
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    /// The provider is disconnected from all chains.
    pub const DISCONNECTED: i64 = 4900;
    /// The chain passed to `wallet_switchEthereumChain` is not registered.
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
}

/// Error categories surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ProviderAbsent,
    UserRejected,
    ValidationFailed,
    RpcFailed,
    ChainUnrecognized,
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::ProviderAbsent => "Provider Absent",
            ErrorKind::UserRejected => "Rejected",
            ErrorKind::ValidationFailed => "Validation Error",
            ErrorKind::RpcFailed => "RPC Error",
            ErrorKind::ChainUnrecognized => "Unknown Chain",
        }
    }
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Wallet provider not installed")]
    NotInstalled,

    /// Structured error returned by the provider; the message is kept verbatim.
    #[error("{message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl ProviderError {
    pub fn rpc(code: i64, message: impl Into<String>) -> Self {
        ProviderError::Rpc {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn user_rejected() -> Self {
        Self::rpc(codes::USER_REJECTED, "User rejected the request.")
    }

    /// Provider error code, if the provider returned one.
    pub fn code(&self) -> Option<i64> {
        match self {
            ProviderError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::NotInstalled => ErrorKind::ProviderAbsent,
            ProviderError::Rpc { code, .. } if *code == codes::USER_REJECTED => {
                ErrorKind::UserRejected
            }
            ProviderError::Rpc { code, .. } if *code == codes::UNRECOGNIZED_CHAIN => {
                ErrorKind::ChainUnrecognized
            }
            _ => ErrorKind::RpcFailed,
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.kind() == ErrorKind::UserRejected
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.kind() == ErrorKind::ChainUnrecognized
    }
}

impl From<walletlink_core::ConversionError> for ProviderError {
    fn from(e: walletlink_core::ConversionError) -> Self {
        ProviderError::InvalidData(e.to_string())
    }
}

/// Outcome of a connection manager or transfer form operation.
#[derive(Error, Debug)]
pub enum WalletError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Validation(String),

    #[error("Please connect your wallet first")]
    NotConnected,

    #[error("A transaction is already being processed")]
    Busy,

    #[error("Transaction {0} reverted")]
    Reverted(String),
}

impl WalletError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::Provider(e) => e.kind(),
            WalletError::Validation(_) | WalletError::NotConnected | WalletError::Busy => {
                ErrorKind::ValidationFailed
            }
            WalletError::Reverted(_) => ErrorKind::RpcFailed,
        }
    }
}
