//! Command-line tasks against a Vyoman deployment.
//!
//! - `deploy`: deploy the token from its compiled artifact
//! - `transfer`: send tokens from the local wallet
//! - `send-eth`: send native ETH from the local wallet
//! - `info`: print token metadata and holder balances

use alloy_primitives::{utils::parse_ether, Address, U256};
use clap::{Parser, Subcommand};
use client::LocalWallet;
use config::NetworkType;
use session::{parse_address, Session};
use token::erc20::Erc20Factory;
use tracing::info;
use vyoman::{config::Config, deploy, display, send_eth, token_info, Artifact};

#[derive(Parser)]
#[command(name = "scripts")]
#[command(about = "Deploy and operate the Vyoman token")]
struct Cli {
    /// Path to the configuration file (defaults to a local Hardhat node)
    #[arg(short, long)]
    config: Option<String>,

    /// Network preset, overriding the configuration file
    #[arg(short, long)]
    network: Option<NetworkType>,

    /// Private key for signing transactions (hex string, with or without 0x prefix)
    #[arg(short = 'k', long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deploy the token, minting the initial supply to the signer
    Deploy {
        /// Hardhat artifact of the compiled contract
        #[arg(long, default_value = "artifacts/contracts/Vyoman.sol/Vyoman.json")]
        artifact: String,

        /// Initial supply in whole tokens
        #[arg(long, default_value = "1000000")]
        supply: String,
    },

    /// Transfer tokens to a recipient
    Transfer {
        /// Token contract address (defaults to the configured token)
        #[arg(long)]
        token: Option<String>,

        #[arg(long)]
        to: String,

        /// Amount in whole tokens
        #[arg(long)]
        amount: String,
    },

    /// Send native ETH to a recipient
    SendEth {
        #[arg(long)]
        to: String,

        /// Amount in ETH
        #[arg(long)]
        amount: String,
    },

    /// Show token metadata and balances
    Info {
        /// Token contract address (defaults to the configured token)
        #[arg(long)]
        token: Option<String>,

        /// Holders to show balances for (the signer is always included when a key is set)
        #[arg(long = "holder")]
        holders: Vec<String>,
    },
}

impl Cli {
    fn wallet(&self) -> eyre::Result<LocalWallet> {
        let Some(private_key) = &self.private_key else {
            eyre::bail!("this command signs transactions: set PRIVATE_KEY or pass --private-key");
        };
        Ok(LocalWallet::from_private_key(private_key)?)
    }
}

/// Whole-token or ETH amount at 18 decimals.
fn ether(amount: &str) -> eyre::Result<U256> {
    if amount.trim_start().starts_with('-') {
        eyre::bail!("amount must not be negative: {amount}");
    }
    Ok(parse_ether(amount.trim())?)
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(network) = cli.network {
        config.network = network;
    }
    let network = config.network_config();

    info!(
        network = %network.network_type,
        chain_id = network.chain_id,
        rpc_url = %network.rpc_url,
        "Loaded config"
    );

    match &cli.command {
        Command::Deploy { artifact, supply } => {
            let wallet = cli.wallet()?;
            let provider = client::create_wallet_provider(&network.rpc_url, &wallet)?;

            let artifact = Artifact::from_file(artifact)?;
            let initial_supply = ether(supply)?;
            info!(
                deployer = %wallet.address(),
                contract = artifact.contract_name.as_deref().unwrap_or("unnamed"),
                supply = %supply,
                "Deploying token"
            );

            let address = deploy(&provider, wallet.address(), &artifact, initial_supply).await?;

            println!("Vyoman deployed to: {address}");
            println!("Tokens minted to: {}", wallet.address());
        }
        Command::Transfer { token, to, amount } => {
            let token = token
                .clone()
                .or_else(|| config.token_address.map(|a| a.to_string()))
                .ok_or_else(|| eyre::eyre!("no token address: pass --token or set token_address"))?;

            let wallet = cli.wallet()?;
            let provider = client::create_wallet_provider(&network.rpc_url, &wallet)?;
            let session = Session::new(wallet, Erc20Factory::new(provider));

            session.connect().await?;
            session.load_token(&token).await?;
            let record = session
                .transfer(to, amount)
                .await?
                .committed()
                .ok_or_else(|| eyre::eyre!("transfer was superseded"))?;

            println!("Transaction Hash: {}", record.hash);
            if let Some(url) = network.tx_url(record.hash) {
                println!("  {url}");
            }
            if let Some(token) = session.snapshot().token {
                println!("Transfer complete! New balance: {}", display::format_balance(&token));
            }
        }
        Command::SendEth { to, amount } => {
            let wallet = cli.wallet()?;
            let provider = client::create_wallet_provider(&network.rpc_url, &wallet)?;

            let to = parse_address(to)?;
            let value = ether(amount)?;
            let tx_hash = send_eth(&provider, wallet.address(), to, value).await?;

            println!("ETH transferred: {tx_hash}");
        }
        Command::Info { token, holders } => {
            let token = match token {
                Some(token) => parse_address(token)?,
                None => config
                    .token_address
                    .ok_or_else(|| eyre::eyre!("no token address: pass --token or set token_address"))?,
            };

            let mut holders = holders
                .iter()
                .map(|holder| parse_address(holder))
                .collect::<Result<Vec<Address>, _>>()?;
            if cli.private_key.is_some() {
                let signer = cli.wallet()?.address();
                if !holders.contains(&signer) {
                    holders.insert(0, signer);
                }
            }

            let provider = client::create_provider(&network.rpc_url)?;
            let info = token_info(provider, token, &holders).await?;

            println!("Token:        {} ({})", info.name, info.symbol);
            println!("Address:      {token}");
            println!("Decimals:     {}", info.decimals);
            println!("Total supply: {} {}", info.total_supply, info.symbol);
            for (holder, balance) in &info.balances {
                println!("  {holder}: {balance} {}", info.symbol);
            }
        }
    }

    Ok(())
}
