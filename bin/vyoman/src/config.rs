use alloy_primitives::Address;
use config::{NetworkConfig, NetworkConfigBuilder, NetworkType};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Network preset (`hardhat` or `sepolia`)
    pub network: NetworkType,

    /// Overrides the preset's RPC endpoint url
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Injected-wallet bridge url; without it a local private key is used
    #[serde(default)]
    pub wallet_url: Option<String>,

    /// Token loaded by a bare `load`
    #[serde(default)]
    pub token_address: Option<Address>,

    /// Serve Prometheus metrics on this port
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkType::Hardhat,
            rpc_url: None,
            wallet_url: None,
            token_address: None,
            metrics_port: None,
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;

        Ok(config)
    }

    /// Load `path` if given, otherwise the local Hardhat defaults.
    pub fn load(path: Option<&str>) -> eyre::Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Network preset with the configured overrides applied.
    pub fn network_config(&self) -> NetworkConfig {
        let builder = NetworkConfigBuilder::from_network_type(self.network);
        match &self.rpc_url {
            Some(url) => builder.rpc_url(url.clone()).build(),
            None => builder.build(),
        }
    }
}
