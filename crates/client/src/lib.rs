mod remote_wallet;
mod wallet;

use alloy_network::EthereumWallet;
use alloy_provider::{Provider, ProviderBuilder};
pub use remote_wallet::RemoteWallet;
use thiserror::Error;
pub use wallet::{LocalWallet, WalletError, WalletProvider};

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error with private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
}

/// Convenience function to create a read-only ethereum rpc provider from url.
///
/// Also used for injected-wallet bridges, which sign `eth_sendTransaction`
/// requests themselves.
pub fn create_provider(rpc_url: &str) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider)
}

/// Create a provider that signs transactions locally with the wallet's key.
pub fn create_wallet_provider(
    rpc_url: &str,
    wallet: &LocalWallet,
) -> Result<impl Provider + Clone, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;

    let wallet = EthereumWallet::from(wallet.signer().clone());

    let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

    Ok(provider)
}
