//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → server stops accepting → in-flight requests drain → exit
//!             → rate-limit sweeper exits
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
