//! Metrics collection and exposition.
//!
//! # Metrics
//! - `api_requests_total` (counter): requests by method, route, status
//! - `api_request_duration_seconds` (histogram): latency distribution
//! - `api_rate_limited_total` (counter): requests rejected by the limiter
//!
//! Recording is a no-op until an exporter is installed.

use std::net::SocketAddr;
use std::time::Instant;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    metrics::counter!("api_requests_total", &labels).increment(1);
    metrics::histogram!("api_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited(path: &str) {
    metrics::counter!("api_rate_limited_total", "path" => path.to_string()).increment(1);
}

/// Middleware recording one sample per completed request.
pub async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    record_request(&method, &route, response.status().as_u16(), start);
    response
}
