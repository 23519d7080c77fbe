//! JSON:API resource documents.
//!
//! # Data Flow
//! ```text
//! POST /jsonapi
//!     → codec.rs (content type check, decode, validate)
//!     → Resource | ParseError
//!     → document.rs (success or error envelope)
//!     → codec.rs (render)
//! ```

pub mod codec;
pub mod document;

use axum::http::HeaderMap;

pub use codec::{JsonApiCodec, ParseError};
pub use document::{Document, ErrorObject, ErrorSource, JsonApiObject, Resource};

/// JSON:API media type, required on requests and set on responses.
pub const CONTENT_TYPE: &str = "application/vnd.api+json";

/// Version advertised in the `jsonapi` member.
pub const JSONAPI_VERSION: &str = "1.1";

/// Parse and render single-resource documents.
pub trait DocumentCodec: Send + Sync {
    /// Validate headers and decode the request body into one resource.
    fn parse(&self, headers: &HeaderMap, body: &[u8]) -> Result<Resource, ParseError>;

    /// Serialize a response envelope.
    fn render(&self, document: &Document) -> serde_json::Result<Vec<u8>>;
}
