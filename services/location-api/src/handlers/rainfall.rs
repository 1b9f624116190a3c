//! Rainfall nowcast lookup handler.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use jmatile_common::Location;
use tracing::{info, warn};

use super::ApiError;
use crate::metrics::{record_error, record_request};
use crate::service::RainfallReport;
use crate::state::AppState;

/// POST /location_rainfall
pub async fn location_rainfall_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(location): Json<Location>,
) -> Result<Json<RainfallReport>, ApiError> {
    record_request("rainfall");

    let report = state
        .rainfall
        .resolve_rainfall(location)
        .await
        .map_err(|e| {
            warn!(lat = location.latitude, lon = location.longitude, error = %e, "Rainfall lookup failed");
            record_error("rainfall", e.error_code());
            ApiError(e)
        })?;

    info!(
        lat = location.latitude,
        lon = location.longitude,
        rainfall = report.rainfall.mm_per_hour(),
        forecast_timestamp = %report.details.forecast_timestamp,
        "Rainfall lookup"
    );

    Ok(Json(report))
}
