//! JSON echo: decode an object, send it back tab-indented.

use axum::{
    body::Bytes,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

use crate::http::response::{method_not_allowed, pretty_json};

pub const JSON_FORMAT_ERROR: &str = "Sorry, there seems to be an error with your JSON formatting.";

pub async fn json_echo(method: Method, body: Bytes) -> Response {
    if method != Method::POST {
        return method_not_allowed(Method::POST);
    }

    // Only the first value is decoded; anything after it is ignored. `null`
    // decodes to an absent object and is echoed back as `null`.
    let first = serde_json::Deserializer::from_slice(&body)
        .into_iter::<Option<Map<String, Value>>>()
        .next();
    let data = match first {
        Some(Ok(data)) => data,
        Some(Err(e)) => {
            tracing::debug!(error = %e, "Rejected malformed JSON body");
            return format_error();
        }
        None => {
            tracing::debug!("Rejected empty JSON body");
            return format_error();
        }
    };

    match pretty_json(&data, b"\t") {
        Ok(bytes) => (
            StatusCode::CREATED,
            [(header::CONTENT_TYPE, "application/json")],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize echo response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn format_error() -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "err": JSON_FORMAT_ERROR }))).into_response()
}
