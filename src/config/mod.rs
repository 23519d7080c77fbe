//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → cloned into the subsystems that need it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs (or none at all)
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, resolve_config, ConfigError};
pub use schema::{
    ComputeConfig, IpLookup, LimitsConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig,
    ServiceConfig, TimeoutConfig,
};
pub use validation::ValidationError;
