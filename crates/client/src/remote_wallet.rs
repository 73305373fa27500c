//! Remote wallet that delegates account access to an injected-wallet bridge.
//!
//! Browser and desktop wallets (MetaMask via a bridge, Frame, ...) expose the
//! EIP-1193 request interface over local HTTP JSON-RPC. Account access goes
//! through `eth_requestAccounts`, which prompts the user; signing stays inside
//! the wallet, so transactions are sent to the same endpoint unsigned.

use crate::wallet::{WalletError, WalletProvider};
use alloy_primitives::Address;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

/// EIP-1193 "User Rejected Request".
const USER_REJECTED: i64 = 4001;
/// EIP-1193 "Unauthorized": the account or method is not authorized.
const UNAUTHORIZED: i64 = 4100;

/// A wallet reached over an HTTP JSON-RPC bridge.
///
/// # Example
///
/// ```ignore
/// let wallet = RemoteWallet::new("http://127.0.0.1:1248");
/// let account = wallet.request_accounts().await?;
/// ```
#[derive(Debug, Clone)]
pub struct RemoteWallet {
    client: reqwest::Client,
    url: String,
}

impl RemoteWallet {
    /// Creates a new remote wallet.
    ///
    /// # Arguments
    /// * `url` - The URL of the wallet bridge (e.g., "http://127.0.0.1:1248")
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn request<T: DeserializeOwned>(&self, method: &'static str) -> Result<T, WalletError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params: [(); 0],
            id: 1,
        };

        debug!(url = %self.url, method, "Sending wallet request");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_builder() {
                    WalletError::ProviderUnavailable(e.to_string())
                } else {
                    WalletError::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(WalletError::Network(format!(
                "wallet bridge returned {status}: {body}"
            )));
        }

        let rpc_response: JsonRpcResponse<T> = response
            .json()
            .await
            .map_err(|e| WalletError::Network(e.to_string()))?;

        match (rpc_response.result, rpc_response.error) {
            (_, Some(error)) => Err(classify_rpc_error(error.code, &error.message)),
            (Some(result), None) => Ok(result),
            (None, None) => Err(WalletError::Network(
                "JSON-RPC response had neither result nor error".to_string(),
            )),
        }
    }
}

impl WalletProvider for RemoteWallet {
    async fn request_accounts(&self) -> Result<Address, WalletError> {
        let accounts: Vec<Address> = self.request("eth_requestAccounts").await?;
        // An empty grant is how some wallets answer a dismissed prompt.
        accounts.first().copied().ok_or(WalletError::UserRejected)
    }
}

/// Map an EIP-1193 error to the wallet error taxonomy.
fn classify_rpc_error(code: i64, message: &str) -> WalletError {
    match code {
        USER_REJECTED | UNAUTHORIZED => WalletError::UserRejected,
        _ => WalletError::Network(format!("JSON-RPC error {code}: {message}")),
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<T> {
    jsonrpc: &'static str,
    method: &'static str,
    params: T,
    id: u32,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}
