//! Liveness probe.

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::response::method_not_allowed;

pub async fn health_check(method: Method) -> Response {
    match method {
        Method::GET => (StatusCode::OK, "ok").into_response(),
        _ => method_not_allowed(Method::GET),
    }
}
