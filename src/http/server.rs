//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the four handlers
//! - Wire up middleware (tracing, request ID, timeout, limits, rate limit)
//! - Serve on a listener until the shutdown signal fires

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ComputeConfig, ServiceConfig};
use crate::handlers::{compute, document, echo, health};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::jsonapi::{DocumentCodec, JsonApiCodec};
use crate::observability::metrics;
use crate::security::limits::{body_limit_layer, rate_limit_header_layers};
use crate::security::{rate_limit_middleware, RateLimiter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub compute: ComputeConfig,
    pub codec: Arc<dyn DocumentCodec>,
}

impl AppState {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            compute: config.compute.clone(),
            codec: Arc::new(JsonApiCodec),
        }
    }
}

/// HTTP server for the service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
    limiter: Arc<RateLimiter>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServiceConfig) -> Self {
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        let state = AppState::new(&config);
        let router = Self::build_router(&config, state, limiter.clone());

        Self {
            router,
            config,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Rate limiting is a route layer: only the four registered paths are
    /// counted, unmatched paths fall through to the default 404.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState, limiter: Arc<RateLimiter>) -> Router {
        let mut routes = Router::new()
            .route("/health", any(health::health_check))
            .route("/", any(compute::standard_get))
            .route("/json", any(echo::json_echo))
            .route("/jsonapi", any(document::create_document))
            .with_state(state);

        if config.rate_limit.enabled {
            let (limit_header, duration_header) = rate_limit_header_layers(&config.rate_limit);
            routes = routes
                .route_layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
                .route_layer(limit_header)
                .route_layer(duration_header);
        }

        routes
            .route_layer(middleware::from_fn(metrics::track_metrics))
            .layer(body_limit_layer(&config.limits))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires. In-flight requests are allowed to finish.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            rate_limit_enabled = self.config.rate_limit.enabled,
            requests_per_second = self.config.rate_limit.requests_per_second,
            "HTTP server starting"
        );

        if self.config.rate_limit.enabled && self.config.rate_limit.bucket_ttl_secs > 0 {
            let ttl = Duration::from_secs(self.config.rate_limit.bucket_ttl_secs);
            tokio::spawn(self.limiter.clone().run_sweeper(ttl, shutdown.resubscribe()));
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Shared rate limiter.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::{header, Method, StatusCode};
    use axum::response::Response;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::handlers::compute::X_COMPUTE_RESPONSE_TIME;
    use crate::handlers::echo::JSON_FORMAT_ERROR;
    use crate::http::X_REQUEST_ID;
    use crate::jsonapi::CONTENT_TYPE as JSONAPI;
    use crate::security::limits::X_RATE_LIMIT_LIMIT;
    use crate::security::rate_limit::RATE_LIMITED_MESSAGE;

    fn test_config() -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.compute.min_delay_ms = 1;
        config.compute.max_delay_ms = 5;
        config
    }

    fn app() -> Router {
        HttpServer::new(test_config()).router()
    }

    async fn send(app: Router, method: Method, uri: &str, content_type: Option<&str>, body: &str) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        app.oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_ok() {
        let response = send(app(), Method::GET, "/health", None, "").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[X_RATE_LIMIT_LIMIT], "10");
        assert!(response.headers().contains_key(X_REQUEST_ID));
        assert_eq!(body_string(response).await, "ok");
    }

    #[tokio::test]
    async fn health_rejects_post() {
        let response = send(app(), Method::POST, "/health", None, "").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body_string(response).await,
            "Sorry, Only GET methods are currently supported"
        );
    }

    #[tokio::test]
    async fn standard_get_reports_compute_time() {
        let response = send(app(), Method::GET, "/", None, "").await;
        assert_eq!(response.status(), StatusCode::OK);

        let timing = response.headers()[X_COMPUTE_RESPONSE_TIME].to_str().unwrap().to_string();
        let ms: u64 = timing.strip_suffix("ms").unwrap().parse().unwrap();
        assert!((1..5).contains(&ms));
        assert_eq!(body_string(response).await, "Here's a Nice Web Page, or some Data");
    }

    #[tokio::test]
    async fn standard_get_rejects_delete() {
        let response = send(app(), Method::DELETE, "/", None, "").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn json_echo_round_trips() {
        let payload = r#"{"some":"data","n":[1,2.5,-3],"nested":{"ok":true,"nothing":null}}"#;
        let response = send(app(), Method::POST, "/json", None, payload).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let body = body_string(response).await;
        assert!(body.contains("\n\t\"some\": \"data\""));
        let echoed: Value = serde_json::from_str(&body).unwrap();
        let sent: Value = serde_json::from_str(payload).unwrap();
        assert_eq!(echoed, sent);
    }

    #[tokio::test]
    async fn json_echo_rejects_bad_json() {
        let response = send(app(), Method::POST, "/json", None, r#"{"some":"msg}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(
            body_string(response).await,
            format!(r#"{{"err":"{}"}}"#, JSON_FORMAT_ERROR)
        );
    }

    #[tokio::test]
    async fn json_echo_rejects_non_object() {
        let response = send(app(), Method::POST, "/json", None, "[1,2]").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn json_echo_ignores_trailing_values() {
        let response = send(app(), Method::POST, "/json", None, "{\"a\":1}\n{\"b\":2}").await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_string(response).await, "{\n\t\"a\": 1\n}\n");
    }

    #[tokio::test]
    async fn json_echo_accepts_null() {
        let response = send(app(), Method::POST, "/json", None, "null").await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_string(response).await, "null\n");
    }

    #[tokio::test]
    async fn json_echo_rejects_empty_body() {
        let response = send(app(), Method::POST, "/json", None, "").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn json_echo_rejects_get() {
        let response = send(app(), Method::GET, "/json", None, "").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body_string(response).await,
            "Sorry, Only POST methods are currently supported"
        );
    }

    #[tokio::test]
    async fn jsonapi_created() {
        let payload = r#"{"data": {"type": "articles","id": "1"}}"#;
        let response = send(app(), Method::POST, "/jsonapi", Some(JSONAPI), payload).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], JSONAPI);
        assert_eq!(
            body_string(response).await,
            "{\n  \"jsonapi\": {\n    \"version\": \"1.1\"\n  },\n  \"data\": {\n    \"type\": \"articles\",\n    \"id\": \"1\"\n  }\n}\n"
        );
    }

    #[tokio::test]
    async fn jsonapi_status_split() {
        let valid = r#"{"data": {"type": "articles","id": "1"}}"#;

        let response = send(app(), Method::POST, "/jsonapi", None, valid).await;
        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);

        let response = send(app(), Method::POST, "/jsonapi", Some(JSONAPI), r#"{"data": { }}"#).await;
        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["errors"][0]["status"], "406");
        assert_eq!(body["errors"][0]["source"]["pointer"], "/data/type");

        let truncated = r#"{"data": {"type": "articles","id": "1"}"#;
        let response = send(app(), Method::POST, "/jsonapi", Some(JSONAPI), truncated).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["errors"][0]["title"], "Internal Server Error");
    }

    #[tokio::test]
    async fn jsonapi_rejects_get() {
        let response = send(app(), Method::GET, "/jsonapi", Some(JSONAPI), "").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let response = send(app(), Method::GET, "/nope", None, "").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn quota_is_shared_across_routes() {
        let mut config = test_config();
        config.rate_limit.requests_per_second = 2;
        config.rate_limit.burst_size = 2;
        let app = HttpServer::new(config).router();

        assert_eq!(send(app.clone(), Method::GET, "/health", None, "").await.status(), StatusCode::OK);
        assert_eq!(
            send(app.clone(), Method::POST, "/json", None, "{}").await.status(),
            StatusCode::CREATED
        );

        let response = send(app.clone(), Method::GET, "/health", None, "").await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[X_RATE_LIMIT_LIMIT], "2");
        assert_eq!(body_string(response).await, RATE_LIMITED_MESSAGE);
    }

    #[tokio::test]
    async fn forwarded_clients_have_separate_quotas() {
        let mut config = test_config();
        config.rate_limit.requests_per_second = 1;
        config.rate_limit.burst_size = 1;
        let app = HttpServer::new(config).router();

        let from = |ip: &'static str| {
            Request::builder()
                .uri("/health")
                .header("X-Forwarded-For", ip)
                .body(Body::empty())
                .unwrap()
        };

        assert_eq!(app.clone().oneshot(from("203.0.113.1")).await.unwrap().status(), StatusCode::OK);
        assert_eq!(
            app.clone().oneshot(from("203.0.113.1")).await.unwrap().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(app.clone().oneshot(from("203.0.113.2")).await.unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn disabled_limiter_never_rejects() {
        let mut config = test_config();
        config.rate_limit.enabled = false;
        config.rate_limit.burst_size = 1;
        let app = HttpServer::new(config).router();

        for _ in 0..5 {
            let response = send(app.clone(), Method::GET, "/health", None, "").await;
            assert_eq!(response.status(), StatusCode::OK);
            assert!(!response.headers().contains_key(X_RATE_LIMIT_LIMIT));
        }
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let mut config = test_config();
        config.limits.max_body_size = 16;
        let app = HttpServer::new(config).router();

        let payload = format!(r#"{{"padding":"{}"}}"#, "x".repeat(64));
        let response = send(app, Method::POST, "/json", None, &payload).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
