//! Wallet provider capability.
//!
//! A wallet provider hands out the active account once the user has granted
//! access. Signing happens wherever the provider lives: in-process for
//! [`LocalWallet`], inside the browser/desktop wallet for
//! [`RemoteWallet`](crate::RemoteWallet).

use crate::ClientError;
use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use std::future::Future;
use thiserror::Error;

/// Failures surfaced by a wallet provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No wallet is reachable (not installed, not running).
    #[error("wallet provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The user declined the account access request.
    #[error("user rejected the request")]
    UserRejected,

    /// The wallet was reachable but the request failed in transit.
    #[error("wallet request failed: {0}")]
    Network(String),
}

/// Trait for wallets that can grant account access.
pub trait WalletProvider: Send + Sync {
    /// Request account access and return the active account.
    fn request_accounts(&self) -> impl Future<Output = Result<Address, WalletError>> + Send;
}

/// Wallet backed by a private key held in process.
///
/// Access is implicit: holding the key is the grant.
#[derive(Debug, Clone)]
pub struct LocalWallet {
    signer: PrivateKeySigner,
}

impl LocalWallet {
    /// Parse a hex private key (with or without 0x prefix).
    pub fn from_private_key(private_key: &str) -> Result<Self, ClientError> {
        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| ClientError::InvalidPrivateKey(format!("{}", e)))?;

        Ok(Self { signer })
    }

    /// Returns the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub const fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl WalletProvider for LocalWallet {
    async fn request_accounts(&self) -> Result<Address, WalletError> {
        Ok(self.address())
    }
}
