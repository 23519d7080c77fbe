//! Request limits and rate-limit advertisement.
//!
//! # Responsibilities
//! - Enforce maximum request body size (413 Payload Too Large)
//! - Advertise the configured quota on every response
//!
//! # Design Decisions
//! - Quota headers are set on rejected responses too, so clients can back off

use axum::http::{HeaderName, HeaderValue};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{LimitsConfig, RateLimitConfig};

/// Requests allowed per window.
pub const X_RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-rate-limit-limit");

/// Window length in seconds.
pub const X_RATE_LIMIT_DURATION: HeaderName = HeaderName::from_static("x-rate-limit-duration");

/// Layers stamping the quota headers onto responses.
pub fn rate_limit_header_layers(
    config: &RateLimitConfig,
) -> (SetResponseHeaderLayer<HeaderValue>, SetResponseHeaderLayer<HeaderValue>) {
    (
        SetResponseHeaderLayer::overriding(X_RATE_LIMIT_LIMIT, HeaderValue::from(config.requests_per_second)),
        SetResponseHeaderLayer::overriding(X_RATE_LIMIT_DURATION, HeaderValue::from_static("1")),
    )
}

/// Layer rejecting bodies larger than the configured maximum.
pub fn body_limit_layer(config: &LimitsConfig) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(config.max_body_size)
}
