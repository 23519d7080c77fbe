//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Simulated compute delay for the standard GET endpoint.
    pub compute: ComputeConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Source consulted when resolving the client identity of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum IpLookup {
    /// Peer address of the TCP connection.
    RemoteAddr,
    /// First entry of the `X-Forwarded-For` header.
    #[serde(rename = "X-Forwarded-For")]
    XForwardedFor,
    /// Value of the `X-Real-IP` header.
    #[serde(rename = "X-Real-IP")]
    XRealIp,
}

/// Rate limiting configuration.
///
/// The quota is global: one bucket per client, shared by every route.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Refill rate per client.
    pub requests_per_second: u32,

    /// Bucket capacity.
    pub burst_size: u32,

    /// Ordered client identity lookups; first present value wins.
    pub ip_lookups: Vec<IpLookup>,

    /// Buckets idle longer than this are evicted.
    pub bucket_ttl_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: 10,
            burst_size: 10,
            ip_lookups: vec![IpLookup::RemoteAddr, IpLookup::XForwardedFor, IpLookup::XRealIp],
            bucket_ttl_secs: 60,
        }
    }
}

/// Bounds of the artificial delay applied by `GET /`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ComputeConfig {
    /// Inclusive lower bound in milliseconds.
    pub min_delay_ms: u64,

    /// Exclusive upper bound in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 500,
            max_delay_ms: 1500,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
