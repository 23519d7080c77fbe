//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack, graceful shutdown)
//!     → request.rs (request ID)
//!     → security (rate limit, body limit)
//!     → handlers
//!     → response.rs (405 and pretty JSON helpers)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
