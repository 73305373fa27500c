//! Network configuration for the token client.
//!
//! Provides chain-specific parameters for the networks the token is deployed
//! to during development (a local Hardhat node) and testing (Sepolia).

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Default Hardhat JSON-RPC endpoint.
pub const HARDHAT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Public Sepolia JSON-RPC endpoint.
pub const SEPOLIA_RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown network `{0}` (expected `hardhat` or `sepolia`)")]
pub struct UnknownNetwork(String);

/// Network type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// Local development node with automine.
    Hardhat,
    Sepolia,
}

impl FromStr for NetworkType {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hardhat" | "localhost" | "local" => Ok(Self::Hardhat),
            "sepolia" => Ok(Self::Sepolia),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hardhat => f.write_str("hardhat"),
            Self::Sepolia => f.write_str("sepolia"),
        }
    }
}

/// Complete network configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network type
    pub network_type: NetworkType,
    /// Chain ID
    pub chain_id: u64,
    /// JSON-RPC endpoint url
    pub rpc_url: String,
    /// Block time in seconds (0 for automine)
    pub block_time_secs: u64,
    /// Block explorer base url, if the network has one
    pub explorer_url: Option<String>,
}

impl NetworkConfig {
    /// Local Hardhat node configuration.
    pub fn hardhat() -> Self {
        Self {
            network_type: NetworkType::Hardhat,
            chain_id: 31337,
            rpc_url: HARDHAT_RPC_URL.to_string(),
            block_time_secs: 0,
            explorer_url: None,
        }
    }

    /// Ethereum Sepolia testnet configuration.
    pub fn sepolia() -> Self {
        Self {
            network_type: NetworkType::Sepolia,
            chain_id: 11155111,
            rpc_url: SEPOLIA_RPC_URL.to_string(),
            block_time_secs: 12,
            explorer_url: Some("https://sepolia.etherscan.io".to_string()),
        }
    }

    /// Create configuration from network type.
    pub fn from_network_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Hardhat => Self::hardhat(),
            NetworkType::Sepolia => Self::sepolia(),
        }
    }

    /// Explorer link for a transaction hash, if the network has an explorer.
    pub fn tx_url(&self, tx_hash: impl fmt::Display) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|base| format!("{base}/tx/{tx_hash}"))
    }
}

/// Builder for custom network configurations.
#[derive(Debug, Clone)]
pub struct NetworkConfigBuilder {
    config: NetworkConfig,
}

impl NetworkConfigBuilder {
    /// Start with local Hardhat defaults.
    pub fn hardhat() -> Self {
        Self {
            config: NetworkConfig::hardhat(),
        }
    }

    /// Start with Sepolia defaults.
    pub fn sepolia() -> Self {
        Self {
            config: NetworkConfig::sepolia(),
        }
    }

    /// Start from the defaults of the given network.
    pub fn from_network_type(network_type: NetworkType) -> Self {
        Self {
            config: NetworkConfig::from_network_type(network_type),
        }
    }

    /// Override the JSON-RPC endpoint.
    pub fn rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.config.rpc_url = rpc_url.into();
        self
    }

    /// Override the chain id.
    pub const fn chain_id(mut self, chain_id: u64) -> Self {
        self.config.chain_id = chain_id;
        self
    }

    /// Build the network configuration.
    pub fn build(self) -> NetworkConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardhat_config() {
        let config = NetworkConfig::hardhat();
        assert_eq!(config.chain_id, 31337);
        assert_eq!(config.rpc_url, HARDHAT_RPC_URL);
        assert_eq!(config.network_type, NetworkType::Hardhat);
        assert_eq!(config.tx_url("0xabc"), None);
    }

    #[test]
    fn test_sepolia_config() {
        let config = NetworkConfig::sepolia();
        assert_eq!(config.chain_id, 11155111);
        assert_eq!(config.network_type, NetworkType::Sepolia);
        assert_eq!(
            config.tx_url("0xabc").as_deref(),
            Some("https://sepolia.etherscan.io/tx/0xabc")
        );
    }

    #[test]
    fn test_custom_config_builder() {
        let config = NetworkConfigBuilder::sepolia()
            .rpc_url("https://eth-sepolia.g.alchemy.com/v2/key")
            .build();

        assert_eq!(config.rpc_url, "https://eth-sepolia.g.alchemy.com/v2/key");
        assert_eq!(config.chain_id, 11155111);
        assert_eq!(config.network_type, NetworkType::Sepolia);
    }

    #[test]
    fn test_network_type_parsing() {
        assert_eq!("hardhat".parse(), Ok(NetworkType::Hardhat));
        assert_eq!("Sepolia".parse(), Ok(NetworkType::Sepolia));
        assert_eq!("localhost".parse(), Ok(NetworkType::Hardhat));
        assert!("mainnet".parse::<NetworkType>().is_err());
        assert_eq!(NetworkType::Sepolia.to_string(), "sepolia");
    }

    #[test]
    fn test_network_type_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            network: NetworkType,
        }

        let wrapper: Wrapper = toml::from_str("network = \"hardhat\"").unwrap();
        assert_eq!(wrapper.network, NetworkType::Hardhat);
        assert!(toml::from_str::<Wrapper>("network = \"mainnet\"").is_err());
    }
}
