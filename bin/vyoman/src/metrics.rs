//! Prometheus metrics for the Vyoman client.
//!
//! All metrics are aggregated in the [`Metrics`] struct for easy tracking and management.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use session::{Outcome, SessionError, SessionState};
use std::time::Duration;

/// Aggregated metrics for the client.
///
/// Metrics are registered with the global metrics registry on creation.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance and register all metric descriptions.
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        // Operation outcomes
        describe_counter!(
            "vyoman_connects_total",
            "Wallet connection attempts by outcome"
        );
        describe_counter!(
            "vyoman_token_loads_total",
            "Token loads by outcome"
        );
        describe_counter!(
            "vyoman_transfers_total",
            "Token transfers by outcome"
        );
        describe_histogram!(
            "vyoman_transfer_duration_seconds",
            "Time from submission to confirmation of a transfer"
        );

        // Session gauges
        describe_gauge!(
            "vyoman_token_balance",
            "Balance of the loaded token, in whole tokens"
        );
        describe_gauge!(
            "vyoman_history_length",
            "Confirmed transfers in the session history"
        );
    }

    pub fn record_connect<T>(&self, result: &Result<Outcome<T>, SessionError>) {
        counter!("vyoman_connects_total", "outcome" => outcome_label(result)).increment(1);
    }

    pub fn record_load<T>(&self, result: &Result<Outcome<T>, SessionError>) {
        counter!("vyoman_token_loads_total", "outcome" => outcome_label(result)).increment(1);
    }

    pub fn record_transfer<T>(&self, result: &Result<Outcome<T>, SessionError>, duration: Duration) {
        let outcome = outcome_label(result);
        counter!("vyoman_transfers_total", "outcome" => outcome).increment(1);
        if outcome == "committed" {
            histogram!("vyoman_transfer_duration_seconds").record(duration.as_secs_f64());
        }
    }

    /// Update the gauges from a state snapshot.
    pub fn observe(&self, state: &SessionState) {
        let balance = state
            .token
            .as_ref()
            .and_then(|token| token.balance.formatted.parse::<f64>().ok())
            .unwrap_or_default();
        gauge!("vyoman_token_balance").set(balance);
        gauge!("vyoman_history_length").set(state.history.len() as f64);
    }
}

/// Label for an operation result: `committed`, `superseded` or `failed`.
pub const fn outcome_label<T>(result: &Result<Outcome<T>, SessionError>) -> &'static str {
    match result {
        Ok(Outcome::Committed(_)) => "committed",
        Ok(Outcome::Superseded) => "superseded",
        Err(_) => "failed",
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
