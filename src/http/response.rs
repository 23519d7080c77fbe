//! Response helpers shared by the handlers.
//!
//! # Responsibilities
//! - Plain-text 405 responses naming the supported method
//! - Pretty JSON serialization with a caller-chosen indent

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// 405 with an `Allow` header and a plain-text explanation.
pub fn method_not_allowed(allowed: Method) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, allowed.as_str().to_string())],
        format!("Sorry, Only {allowed} methods are currently supported"),
    )
        .into_response()
}

/// Serialize `value` pretty-printed with `indent` per level, plus a trailing newline.
pub fn pretty_json<T: Serialize + ?Sized>(value: &T, indent: &[u8]) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent));
    value.serialize(&mut serializer)?;
    out.push(b'\n');
    Ok(out)
}
