//! JSON:API resource creation.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::response::method_not_allowed;
use crate::http::server::AppState;
use crate::jsonapi::{self, Document, ParseError};

pub async fn create_document(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        return method_not_allowed(Method::POST);
    }

    let (status, document) = match state.codec.parse(&headers, &body) {
        Ok(resource) => {
            tracing::info!(kind = %resource.kind, id = %resource.id, "Accepted resource");
            (StatusCode::CREATED, Document::from_resource(resource))
        }
        Err(err) => {
            match &err {
                ParseError::Malformed(e) => tracing::error!(error = %e, "Error parsing JSON Document"),
                _ => tracing::warn!(error = %err, "Rejected JSON:API request"),
            }
            (err.status(), Document::from_errors(vec![err.to_error_object()]))
        }
    };

    match state.codec.render(&document) {
        Ok(bytes) => (status, [(header::CONTENT_TYPE, jsonapi::CONTENT_TYPE)], bytes).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render JSON:API document");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
