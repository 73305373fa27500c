//! Contract client capability for the Vyoman token.
//!
//! This crate provides typed access to a deployed ERC20 contract: metadata and
//! balance reads, transfers returning a pending-transaction handle, and the
//! smallest-unit conversions needed to present amounts.

pub mod erc20;
pub mod units;

use alloy_primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// Failures surfaced by contract calls and transactions.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallError {
    /// The wallet declined to sign.
    #[error("user rejected the request")]
    UserRejected,

    /// The call or transaction executed and was rejected by the chain.
    #[error("call reverted: {0}")]
    CallReverted(String),

    /// The request never got an answer from the chain.
    #[error("network error: {0}")]
    Network(String),

    /// The contract answered with data the client cannot use.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl CallError {
    /// Map a JSON-RPC error response to the call error taxonomy.
    ///
    /// Any error response from a node means the request was evaluated and
    /// refused, so everything besides an explicit wallet rejection is treated
    /// as a revert.
    pub fn from_rpc(code: i64, message: &str) -> Self {
        const USER_REJECTED: i64 = 4001;

        let lower = message.to_ascii_lowercase();
        if code == USER_REJECTED || lower.contains("user rejected") || lower.contains("user denied")
        {
            Self::UserRejected
        } else {
            Self::CallReverted(message.to_string())
        }
    }
}

/// Receipt summary of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block number where transaction was included
    pub block_number: Option<u64>,
    /// Gas used
    pub gas_used: u64,
}

/// Handle to a submitted transaction.
pub trait PendingTransaction: Send {
    /// Hash the transaction was broadcast under.
    fn tx_hash(&self) -> TxHash;

    /// Wait until the transaction is mined.
    ///
    /// Fails with [`CallError::CallReverted`] if it was mined but reverted.
    fn confirm(self) -> impl Future<Output = Result<Confirmation, CallError>> + Send;
}

/// Typed access to one deployed token, acting for one signer.
pub trait TokenClient: Send + Sync {
    type Pending: PendingTransaction;

    /// Address of the bound contract.
    fn address(&self) -> Address;

    fn name(&self) -> impl Future<Output = Result<String, CallError>> + Send;

    fn symbol(&self) -> impl Future<Output = Result<String, CallError>> + Send;

    fn decimals(&self) -> impl Future<Output = Result<u8, CallError>> + Send;

    /// Balance in the token's smallest unit.
    fn balance_of(&self, holder: Address)
        -> impl Future<Output = Result<U256, CallError>> + Send;

    /// Submit `transfer(to, amount)`, `amount` in the smallest unit.
    fn transfer(
        &self,
        to: Address,
        amount: U256,
    ) -> impl Future<Output = Result<Self::Pending, CallError>> + Send;
}

/// Builds [`TokenClient`]s bound to a contract address and signer.
pub trait TokenClientFactory: Send + Sync {
    type Client: TokenClient;

    fn bind(&self, token: Address, signer: Address) -> Self::Client;
}
