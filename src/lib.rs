//! Rate-limited demonstration API.
//!
//! Four endpoints behind one global token-bucket rate limiter:
//!
//! - `GET /health`: liveness probe
//! - `GET /`: slow page with a simulated 500-1500ms compute delay
//! - `POST /json`: echoes a JSON object back, tab-indented
//! - `POST /jsonapi`: accepts a JSON:API resource document

pub mod config;
pub mod handlers;
pub mod http;
pub mod jsonapi;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
