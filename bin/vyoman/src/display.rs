//! Text rendering of the session for the dashboard.

use alloy_primitives::Address;
use chrono::{DateTime, Local, Utc};
use config::NetworkConfig;
use session::{Phase, SessionState, TokenHandle, TransferRecord};

/// Decimal places shown for balances.
pub const BALANCE_PLACES: u8 = 4;

/// `0x1234...abcd` for anything longer than that.
pub fn shorten(full: &str) -> String {
    if full.len() <= 13 || !full.is_ascii() {
        return full.to_string();
    }
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

pub fn short_address(address: &Address) -> String {
    shorten(&address.to_string())
}

/// Balance rounded for display with the token symbol, e.g. `1.0000 VYO`.
pub fn format_balance(token: &TokenHandle) -> String {
    format!(
        "{} {}",
        token.balance.display(token.decimals, BALANCE_PLACES),
        token.symbol
    )
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn describe_phase(state: &SessionState) -> String {
    match &state.phase {
        Phase::TokenLoading { address, .. } => {
            format!("loading token {}", short_address(address))
        }
        Phase::TransferPending { transfer } => {
            let mut line = format!(
                "sending {} to {}",
                transfer.request.amount,
                short_address(&transfer.request.recipient)
            );
            match transfer.hash {
                Some(hash) => line.push_str(&format!(" (tx {})", shorten(&hash.to_string()))),
                None => line.push_str(" (waiting for wallet)"),
            }
            line
        }
        phase => phase.name().to_string(),
    }
}

/// Multi-line summary of the session.
pub fn render_status(state: &SessionState, network: &NetworkConfig) -> String {
    let mut lines = vec![format!(
        "Network:  {} (chain {})",
        network.network_type, network.chain_id
    )];

    lines.push(match state.account {
        Some(account) => format!("Account:  {}", short_address(&account)),
        None => "Account:  not connected".to_string(),
    });
    lines.push(format!("Status:   {}", describe_phase(state)));

    if let Some(token) = &state.token {
        lines.push(format!(
            "Token:    {} ({}) at {}",
            token.name,
            token.symbol,
            short_address(&token.address)
        ));
        lines.push(format!("Balance:  {}", format_balance(token)));
    }
    if let Some(notice) = &state.notice {
        lines.push(format!("Notice:   {notice}"));
    }
    if let Some(error) = &state.error {
        lines.push(format!("Error:    {error}"));
    }

    lines.join("\n")
}

fn render_record(record: &TransferRecord, symbol: &str, network: &NetworkConfig) -> String {
    let mut line = format!(
        "{}  {} {} -> {}  {}",
        format_timestamp(&record.timestamp),
        record.amount,
        symbol,
        short_address(&record.recipient),
        shorten(&record.hash.to_string())
    );
    if let Some(url) = network.tx_url(record.hash) {
        line.push_str(&format!("  {url}"));
    }
    line
}

/// Confirmed transfers, newest first.
pub fn render_history(state: &SessionState, network: &NetworkConfig) -> String {
    if state.history.is_empty() {
        return "No transfers yet".to_string();
    }
    let symbol = state.token.as_ref().map_or("", |token| token.symbol.as_str());

    state
        .history
        .iter()
        .rev()
        .map(|record| render_record(record, symbol, network))
        .collect::<Vec<_>>()
        .join("\n")
}
