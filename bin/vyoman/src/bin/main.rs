use clap::Parser;
use client::{LocalWallet, RemoteWallet};
use config::NetworkType;
use session::Session;
use token::erc20::Erc20Factory;
use tracing::info;
use vyoman::{
    config::Config,
    dashboard::Dashboard,
    metrics::{install_prometheus_exporter, Metrics},
};

#[derive(Parser)]
#[command(name = "vyoman")]
#[command(about = "Interactive dashboard for the Vyoman token")]
struct Cli {
    /// Path to the configuration file (defaults to a local Hardhat node)
    #[arg(short, long)]
    config: Option<String>,

    /// Network preset, overriding the configuration file
    #[arg(short, long)]
    network: Option<NetworkType>,

    /// Injected-wallet bridge url, overriding the configuration file
    #[arg(long, env = "VYOMAN_WALLET_URL")]
    wallet_url: Option<String>,

    /// Private key for a local wallet, used when no wallet bridge is configured
    #[arg(short = 'k', long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let logs = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        logs.json().init();
    } else {
        logs.init();
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(network) = cli.network {
        config.network = network;
    }
    if cli.wallet_url.is_some() {
        config.wallet_url = cli.wallet_url;
    }
    let network = config.network_config();

    info!(
        network = %network.network_type,
        chain_id = network.chain_id,
        rpc_url = %network.rpc_url,
        "Starting Vyoman dashboard"
    );

    if let Some(port) = config.metrics_port {
        install_prometheus_exporter(port)?;
        info!(port, "Serving Prometheus metrics");
    }
    let metrics = Metrics::new();
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());

    if let Some(url) = &config.wallet_url {
        info!(wallet = %url, "Using wallet bridge");

        // The bridge signs, so reads and transactions both go through it.
        let provider = client::create_provider(url)?;
        let session = Session::new(RemoteWallet::new(url.clone()), Erc20Factory::new(provider));
        Dashboard::new(session, network, config.token_address, metrics)
            .run(stdin)
            .await
    } else {
        let Some(private_key) = cli.private_key else {
            eyre::bail!("no wallet configured: set wallet_url or PRIVATE_KEY");
        };
        let wallet = LocalWallet::from_private_key(&private_key)?;
        info!(account = %wallet.address(), "Using local wallet");

        let provider = client::create_wallet_provider(&network.rpc_url, &wallet)?;
        let session = Session::new(wallet, Erc20Factory::new(provider));
        Dashboard::new(session, network, config.token_address, metrics)
            .run(stdin)
            .await
    }
}
