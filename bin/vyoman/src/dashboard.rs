//! Interactive dashboard driving a [`Session`] from line commands.
//!
//! Connects, loads, transfers and refreshes run as background tasks so the
//! prompt stays responsive; `cancel` and `disconnect` take effect while they
//! are in flight.

use crate::{
    command::{Command, HELP},
    display,
    metrics::Metrics,
};
use alloy_primitives::Address;
use client::WalletProvider;
use config::NetworkConfig;
use session::{Outcome, Session, SessionError};
use std::{io::Write, sync::Arc, time::Instant};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    task::JoinSet,
};
use token::TokenClientFactory;
use tracing::debug;

pub struct Dashboard<W, F> {
    session: Arc<Session<W, F>>,
    network: NetworkConfig,
    default_token: Option<Address>,
    metrics: Metrics,
}

impl<W, F> Dashboard<W, F>
where
    W: WalletProvider + 'static,
    F: TokenClientFactory + 'static,
{
    pub fn new(
        session: Session<W, F>,
        network: NetworkConfig,
        default_token: Option<Address>,
        metrics: Metrics,
    ) -> Self {
        Self {
            session: Arc::new(session),
            network,
            default_token,
            metrics,
        }
    }

    pub fn session(&self) -> &Session<W, F> {
        &self.session
    }

    /// Read commands from `input` until `quit`, end of input or Ctrl-C.
    ///
    /// Background work still running on exit is aborted.
    pub async fn run<R>(&self, input: R) -> eyre::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut tasks = JoinSet::new();

        println!("{HELP}");
        loop {
            print!("vyoman> ");
            std::io::stdout().flush()?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => None,
            };
            let Some(line) = line else {
                break;
            };

            match line.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(command) => self.execute(command, &mut tasks)?,
                Err(e) => println!("{e}"),
            }

            // Reap finished tasks so the set does not grow for the whole session.
            while tasks.try_join_next().is_some() {}
        }

        if !tasks.is_empty() {
            debug!(tasks = tasks.len(), "Aborting background work");
        }
        tasks.shutdown().await;
        Ok(())
    }

    /// Execute one command, spawning chain work onto `tasks`.
    pub fn execute(&self, command: Command, tasks: &mut JoinSet<()>) -> eyre::Result<()> {
        match command {
            Command::Connect => {
                let session = self.session.clone();
                let metrics = self.metrics.clone();
                tasks.spawn(async move {
                    let result = session.connect().await;
                    metrics.record_connect(&result);
                    report(result, |account| {
                        format!("Wallet connected: {}", display::short_address(&account))
                    });
                });
            }
            Command::Load(address) => {
                let Some(address) = address.or_else(|| self.default_token.map(|a| a.to_string()))
                else {
                    println!("usage: load <address> (no default token configured)");
                    return Ok(());
                };
                let session = self.session.clone();
                let metrics = self.metrics.clone();
                tasks.spawn(async move {
                    let result = session.load_token(&address).await;
                    metrics.record_load(&result);
                    metrics.observe(&session.snapshot());
                    report(result, |token| {
                        format!(
                            "Contract loaded: {} ({}), balance {}",
                            token.name,
                            token.symbol,
                            display::format_balance(&token)
                        )
                    });
                });
            }
            Command::Transfer { to, amount } => {
                let session = self.session.clone();
                let metrics = self.metrics.clone();
                let network = self.network.clone();
                tasks.spawn(async move {
                    let started = Instant::now();
                    let result = session.transfer(&to, &amount).await;
                    metrics.record_transfer(&result, started.elapsed());
                    let state = session.snapshot();
                    metrics.observe(&state);
                    report(result, |record| {
                        let mut message = format!(
                            "Transfer successful: {} -> {} in {}",
                            record.amount,
                            display::short_address(&record.recipient),
                            display::shorten(&record.hash.to_string())
                        );
                        if let Some(url) = network.tx_url(record.hash) {
                            message.push_str(&format!("\n  {url}"));
                        }
                        if let Some(token) = &state.token {
                            message.push_str(&format!(
                                "\n  New balance: {}",
                                display::format_balance(token)
                            ));
                        }
                        message
                    });
                });
            }
            Command::Refresh => {
                let session = self.session.clone();
                let metrics = self.metrics.clone();
                tasks.spawn(async move {
                    let result = session.refresh_balance().await;
                    let state = session.snapshot();
                    metrics.observe(&state);
                    report(result, |_| match &state.token {
                        Some(token) => format!("Balance: {}", display::format_balance(token)),
                        None => "Balance refreshed".to_string(),
                    });
                });
            }
            Command::Cancel => {
                if self.session.cancel_load() {
                    println!("Load cancelled");
                } else {
                    println!("No load in progress");
                }
            }
            Command::Status => {
                println!(
                    "{}",
                    display::render_status(&self.session.snapshot(), &self.network)
                );
            }
            Command::History => {
                println!(
                    "{}",
                    display::render_history(&self.session.snapshot(), &self.network)
                );
            }
            Command::Json => {
                println!("{}", serde_json::to_string_pretty(&self.session.snapshot())?);
            }
            Command::Dismiss => self.session.dismiss(),
            Command::Disconnect => {
                self.session.disconnect();
                self.metrics.observe(&self.session.snapshot());
                println!("Disconnected");
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }

        Ok(())
    }
}

/// Print the result of a background operation. Superseded work is silent.
fn report<T>(result: Result<Outcome<T>, SessionError>, describe: impl FnOnce(T) -> String) {
    match result {
        Ok(Outcome::Committed(value)) => println!("{}", describe(value)),
        Ok(Outcome::Superseded) => {}
        Err(e) => println!("Error: {e}"),
    }
}
