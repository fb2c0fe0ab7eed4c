//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): dispatched requests by plugin, method, status
//! - `gateway_routes_mounted` (gauge): routes on the frozen router
//!
//! Without an installed recorder every call is a no-op, so tests need no setup.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(plugin: &str, method: &str, status: u16) {
    metrics::counter!(
        "gateway_requests_total",
        "plugin" => plugin.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_routes_mounted(count: usize) {
    metrics::gauge!("gateway_routes_mounted").set(count as f64);
}
