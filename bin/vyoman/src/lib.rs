pub mod command;
pub mod config;
pub mod dashboard;
pub mod display;
pub mod metrics;

use alloy_network::TransactionBuilder;
use alloy_primitives::{utils::format_ether, Address, Bytes, TxHash, U256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::TransactionRequest;
use alloy_sol_types::SolValue;
use serde::Deserialize;
use std::path::Path;
use token::{erc20::Erc20Client, units, TokenClient};
use tracing::info;

/// Compiled contract artifact, as written by the Hardhat compiler.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(default)]
    pub contract_name: Option<String>,
    /// Creation code
    pub bytecode: Bytes,
}

impl Artifact {
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let artifact: Self = serde_json::from_str(&contents)?;

        Ok(artifact)
    }

    /// Creation code followed by the ABI-encoded `initialSupply` argument.
    pub fn deploy_code(&self, initial_supply: U256) -> Bytes {
        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(&initial_supply.abi_encode());
        code.into()
    }
}

/// Deploy the token, minting `initial_supply` (smallest unit) to `deployer`.
pub async fn deploy<P>(
    provider: &P,
    deployer: Address,
    artifact: &Artifact,
    initial_supply: U256,
) -> eyre::Result<Address>
where
    P: Provider,
{
    if artifact.bytecode.is_empty() {
        eyre::bail!("artifact has no creation code");
    }

    let tx = TransactionRequest::default()
        .with_from(deployer)
        .with_deploy_code(artifact.deploy_code(initial_supply));

    let pending = provider.send_transaction(tx).await?;
    info!(tx_hash = %pending.tx_hash(), "Deployment sent");

    let receipt = pending.get_receipt().await?;
    if !receipt.status() {
        eyre::bail!("deployment {} reverted", receipt.transaction_hash);
    }
    let address = receipt
        .contract_address
        .ok_or_else(|| eyre::eyre!("receipt {} has no contract address", receipt.transaction_hash))?;

    info!(
        contract = %address,
        deployer = %deployer,
        block_number = receipt.block_number,
        "Token deployed"
    );
    Ok(address)
}

/// Send `amount` wei from `from` to `to` and wait for the receipt.
pub async fn send_eth<P>(provider: &P, from: Address, to: Address, amount: U256) -> eyre::Result<TxHash>
where
    P: Provider,
{
    let tx = TransactionRequest::default()
        .with_from(from)
        .with_to(to)
        .with_value(amount);

    let receipt = provider.send_transaction(tx).await?.get_receipt().await?;
    if !receipt.status() {
        eyre::bail!("transfer {} reverted", receipt.transaction_hash);
    }

    info!(
        tx_hash = %receipt.transaction_hash,
        to = %to,
        amount = %format_ether(amount),
        "ETH transferred"
    );
    Ok(receipt.transaction_hash)
}

/// Token metadata and the balances of selected holders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: String,
    /// `(holder, formatted balance)`
    pub balances: Vec<(Address, String)>,
}

pub async fn token_info<P>(provider: P, token: Address, holders: &[Address]) -> eyre::Result<TokenInfo>
where
    P: Provider + Clone,
{
    let client = Erc20Client::new(provider, token, Address::ZERO);

    let name = client.name().await?;
    let symbol = client.symbol().await?;
    let decimals = client.decimals().await?;
    let total_supply = units::format_units(client.total_supply().await?, decimals)?;

    let mut balances = Vec::with_capacity(holders.len());
    for holder in holders {
        let raw = client.balance_of(*holder).await?;
        balances.push((*holder, units::format_units(raw, decimals)?));
    }

    Ok(TokenInfo {
        name,
        symbol,
        decimals,
        total_supply,
        balances,
    })
}
