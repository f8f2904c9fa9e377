//! Metrics collection and exposition.
//!
//! # Metrics
//! - `access_resolutions_total` (counter): resolutions by role and outcome
//! - `access_resolution_duration_seconds` (histogram): end-to-end resolve latency
//! - `access_stale_discards_total` (counter): superseded results dropped by the session
//! - `access_writes_total` (counter): role mutations by outcome
//! - `access_rpc_failures_total` (counter): RPC operations that exhausted every provider

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Install the Prometheus exporter on `addr`. Requires a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_resolution(role: &'static str, outcome: &'static str, elapsed: Duration) {
    counter!("access_resolutions_total", "role" => role, "outcome" => outcome).increment(1);
    histogram!("access_resolution_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_stale_discard() {
    counter!("access_stale_discards_total").increment(1);
}

pub fn record_write(outcome: &'static str) {
    counter!("access_writes_total", "outcome" => outcome).increment(1);
}

pub fn record_rpc_failure(op: &'static str) {
    counter!("access_rpc_failures_total", "op" => op).increment(1);
}
