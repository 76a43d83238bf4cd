//! Metrics collection and exposition.
//!
//! # Metrics
//! - `market_tx_transitions_total` (counter): phase transitions by operation, phase
//! - `market_tx_submissions_total` (counter): transactions accepted by the wallet
//! - `market_tx_failures_total` (counter): failed attempts by operation, error kind
//! - `market_tx_confirmation_seconds` (histogram): submit-to-receipt latency
//!
//! All recorders are no-ops until `init_metrics` installs an exporter.

use std::net::SocketAddr;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a lifecycle phase transition.
pub fn record_transition(operation: &'static str, phase: &'static str) {
    counter!("market_tx_transitions_total", "operation" => operation, "phase" => phase)
        .increment(1);
}

/// Record a transaction accepted by the wallet.
pub fn record_submission(operation: &'static str) {
    counter!("market_tx_submissions_total", "operation" => operation).increment(1);
}

/// Record a failed attempt.
pub fn record_failure(operation: &'static str, kind: &'static str) {
    counter!("market_tx_failures_total", "operation" => operation, "kind" => kind).increment(1);
}

/// Record how long a transaction took from acceptance to receipt.
pub fn record_confirmation_latency(operation: &'static str, seconds: f64) {
    histogram!("market_tx_confirmation_seconds", "operation" => operation).record(seconds);
}
