//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and middleware produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID (`x-request-id`) is attached to every HTTP span
//! - Metrics are cheap when no exporter is installed

pub mod logging;
pub mod metrics;
