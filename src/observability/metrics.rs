//! Metrics collection and exposition.
//!
//! # Metrics
//! - `macproxy_requests_total` (counter): requests by route kind and status
//! - `macproxy_request_duration_seconds` (histogram): end-to-end latency
//! - `macproxy_image_cache_total` (counter): image lookups by outcome
//! - `macproxy_override_transitions_total` (counter): override slot changes
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Prometheus exporter only runs when enabled in config

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished proxy request.
pub fn record_request(route: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "macproxy_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("macproxy_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

/// Record an image cache lookup (`hit`, `stored`, `failed`).
pub fn record_image(outcome: &'static str) {
    metrics::counter!("macproxy_image_cache_total", "outcome" => outcome).increment(1);
}

/// Record an override slot change (`enabled`, `disabled`, `reset`).
pub fn record_override(transition: &'static str) {
    metrics::counter!("macproxy_override_transitions_total", "transition" => transition)
        .increment(1);
}
