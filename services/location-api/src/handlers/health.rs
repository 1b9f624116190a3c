//! Health and metrics handlers.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::metrics::refresh_cache_metrics;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: bool,
}

/// GET /healthcheck - Liveness probe
pub async fn healthcheck_handler() -> Json<HealthStatus> {
    Json(HealthStatus { status: true })
}

/// GET /metrics - Prometheus metrics
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let Some(handle) = state.prometheus.as_ref() else {
        return (StatusCode::NOT_FOUND, "metrics recorder not installed\n").into_response();
    };

    refresh_cache_metrics(&state).await;

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response()
}
