//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Derive the default filter from configuration
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` overrides the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(config: &ObservabilityConfig) -> String {
    format!("rate_limited_api={},tower_http=debug", config.log_level)
}

/// Install the global subscriber.
pub fn init(config: &ObservabilityConfig) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config).into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
