//! Router construction and server host for the API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, Request, header::CONTENT_TYPE},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::Span;

use apkshield_config::AppConfig;
use apkshield_telemetry::{Metrics, REQUEST_ID_HEADER, build_sha};

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::constants::MULTIPART_OVERHEAD_BYTES;
use crate::http::health::{health, metrics};
use crate::http::index::index;
use crate::http::protect::protect;
use crate::state::ApiState;

/// Axum router wrapper that hosts the protection service.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Construct a new API server with shared dependencies wired through
    /// application state.
    #[must_use]
    pub fn new(config: AppConfig, metrics: Metrics) -> Self {
        let state = Arc::new(ApiState::new(config, metrics));
        Self::with_state(state)
    }

    pub(crate) fn with_state(state: Arc<ApiState>) -> Self {
        let body_limit = usize::try_from(
            state
                .config
                .max_upload_bytes
                .saturating_add(MULTIPART_OVERHEAD_BYTES),
        )
        .unwrap_or(usize::MAX);

        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE]);
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let method = request.method().clone();
                let uri_path = request.uri().path();
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();

                tracing::info_span!(
                    "http.request",
                    method = %method,
                    route = %uri_path,
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    let status = response.status().as_u16();
                    span.record("status_code", status);
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );
        let layered = ServiceBuilder::new()
            .layer(apkshield_telemetry::propagate_request_id_layer())
            .layer(apkshield_telemetry::set_request_id_layer())
            .layer(trace_layer);

        let router = Self::build_router()
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(cors_layer)
            .route_layer(layered)
            .with_state(state);

        Self { router }
    }

    fn build_router() -> Router<Arc<ApiState>> {
        Router::new()
            .route("/", get(index))
            .route("/health", get(health))
            .route("/metrics", get(metrics))
            .route("/protect", post(protect))
    }

    /// Serve the API using the configured router on the supplied address.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server terminates
    /// unexpectedly.
    pub async fn serve(self, addr: SocketAddr) -> ApiServerResult<()> {
        tracing::info!("Starting API on {}", addr);
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        axum::serve(listener, self.router.into_make_service())
            .await
            .map_err(|source| ApiServerError::Serve { source })?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) const fn router(&self) -> &Router {
        &self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::state_with_scratch;
    use axum::body::Body;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn server() -> (ApiServer, tempfile::TempDir) {
        let scratch = tempfile::tempdir().expect("tempdir");
        let state = state_with_scratch(scratch.path());
        (ApiServer::with_state(state), scratch)
    }

    #[tokio::test]
    async fn health_route_is_mounted() {
        let (server, _scratch) = server();
        let response = server
            .router()
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_route_is_mounted() {
        let (server, _scratch) = server();
        let response = server
            .router()
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn index_serves_the_upload_form() {
        let (server, _scratch) = server();
        let response = server
            .router()
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protect_without_a_body_is_rejected() {
        let (server, _scratch) = server();
        let response = server
            .router()
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/protect")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert!(response.status().is_client_error());
    }
}
