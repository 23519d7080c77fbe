//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Build the runtime configuration from an optional file and a bind override.
///
/// The result is validated whatever its source, defaults included.
pub fn resolve_config(path: Option<&Path>, bind: Option<String>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = bind {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
