//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (rates > 0, delay bounds ordered, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a parsed configuration for values serde cannot reject on its own.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let rl = &config.rate_limit;
    if rl.enabled {
        if rl.requests_per_second == 0 {
            errors.push(ValidationError::new("rate_limit.requests_per_second", "must be greater than 0"));
        }
        if rl.burst_size == 0 {
            errors.push(ValidationError::new("rate_limit.burst_size", "must be greater than 0"));
        }
        if rl.ip_lookups.is_empty() {
            errors.push(ValidationError::new("rate_limit.ip_lookups", "at least one lookup is required"));
        }
        if rl.bucket_ttl_secs == 0 {
            errors.push(ValidationError::new("rate_limit.bucket_ttl_secs", "must be greater than 0"));
        }
    }

    if config.compute.min_delay_ms >= config.compute.max_delay_ms {
        errors.push(ValidationError::new(
            "compute",
            format!(
                "min_delay_ms ({}) must be less than max_delay_ms ({})",
                config.compute.min_delay_ms, config.compute.max_delay_ms
            ),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::new("limits.max_body_size", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.rate_limit.requests_per_second = 0;
        config.compute.min_delay_ms = 2000;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["listener.bind_address", "rate_limit.requests_per_second", "compute"]);
    }

    #[test]
    fn test_disabled_rate_limit_skips_checks() {
        let mut config = ServiceConfig::default();
        config.rate_limit.enabled = false;
        config.rate_limit.burst_size = 0;
        assert!(validate_config(&config).is_ok());
    }
}
