//! Health and metrics endpoints.

use std::sync::Arc;

use axum::{Json, body::Body, extract::State, http::StatusCode, response::Response};
use tracing::error;

use apkshield_jobs::HealthReport;

use crate::http::errors::ApiError;
use crate::state::ApiState;

/// `GET /health`: probe the tool jar and Java launcher. Never fails; missing
/// capabilities surface as negative fields in the body.
pub(crate) async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthReport> {
    Json(state.probe.report().await)
}

/// `GET /metrics`: Prometheus text exposition.
pub(crate) async fn metrics(State(state): State<Arc<ApiState>>) -> Result<Response, ApiError> {
    match state.metrics.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )
            .body(Body::from(body))
            .map_err(|err| {
                error!(error = %err, "failed to build metrics response");
                ApiError::internal("failed to build metrics response")
            }),
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            Err(ApiError::internal("failed to render metrics"))
        }
    }
}
