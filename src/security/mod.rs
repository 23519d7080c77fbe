//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → client_ip.rs (resolve client identity)
//!     → rate_limit.rs (check the global per-client quota)
//!     → limits.rs (rate limit headers, body size)
//!     → Pass to handler
//! ```
//!
//! # Design Decisions
//! - Quota is global: one bucket per client across all routes
//! - Fail closed: over-quota requests never reach a handler

pub mod client_ip;
pub mod limits;
pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, RateLimiter};
