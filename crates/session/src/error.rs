use client::WalletError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use token::CallError;

/// Every way a session operation can fail.
///
/// Errors are also kept in the session state as the user-visible status, so
/// they are plain data.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionError {
    #[error("wallet provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("user rejected the request")]
    UserRejected,

    #[error("invalid address `{0}`")]
    InvalidAddress(String),

    #[error("invalid amount `{amount}`: {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("failed to load contract: {0}")]
    ContractLoadFailed(CallError),

    #[error("transfer failed: {0}")]
    TransferFailed(CallError),

    #[error("cannot {operation} while {phase}")]
    InvalidState { operation: String, phase: String },

    #[error("network error: {0}")]
    Network(String),
}

impl SessionError {
    pub(crate) fn invalid_state(operation: &str, phase: &str) -> Self {
        Self::InvalidState {
            operation: operation.to_string(),
            phase: phase.to_string(),
        }
    }
}

impl From<WalletError> for SessionError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::ProviderUnavailable(reason) => Self::ProviderUnavailable(reason),
            WalletError::UserRejected => Self::UserRejected,
            WalletError::Network(reason) => Self::Network(reason),
        }
    }
}
