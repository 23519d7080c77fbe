//! Slow GET endpoint emulating an expensive backend call.

use std::time::{Duration, SystemTime, UNIX_EPOCH};
use axum::{
    extract::State,
    http::{HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::ComputeConfig;
use crate::http::response::method_not_allowed;
use crate::http::server::AppState;

/// Reports the simulated compute time, e.g. `"734ms"`.
pub const X_COMPUTE_RESPONSE_TIME: HeaderName = HeaderName::from_static("x-compute-response-time");

pub const PAGE_BODY: &str = "Here's a Nice Web Page, or some Data";

/// Pick a delay in `[min_delay_ms, max_delay_ms)` from an RNG seeded with the current time.
///
/// An empty range yields `min_delay_ms`.
pub fn pick_delay(config: &ComputeConfig) -> Duration {
    if config.min_delay_ms >= config.max_delay_ms {
        return Duration::from_millis(config.min_delay_ms);
    }
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let mut rng = StdRng::seed_from_u64(seed);
    Duration::from_millis(rng.gen_range(config.min_delay_ms..config.max_delay_ms))
}

pub async fn standard_get(State(state): State<AppState>, method: Method) -> Response {
    if method != Method::GET {
        return method_not_allowed(Method::GET);
    }

    let delay = pick_delay(&state.compute);
    tracing::debug!(delay_ms = delay.as_millis() as u64, "Simulating backend call");
    tokio::time::sleep(delay).await;

    (
        StatusCode::OK,
        [(X_COMPUTE_RESPONSE_TIME, format!("{}ms", delay.as_millis()))],
        PAGE_BODY,
    )
        .into_response()
}
