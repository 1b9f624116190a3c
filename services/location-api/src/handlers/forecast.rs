//! Weather forecast lookup handler.

use std::sync::Arc;

use axum::{extract::Extension, Json};
use jmatile_common::Location;
use tracing::{info, warn};

use super::ApiError;
use crate::metrics::{record_error, record_request};
use crate::service::WeatherReport;
use crate::state::AppState;

/// POST /location_weather_forecast
pub async fn location_weather_forecast_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(location): Json<Location>,
) -> Result<Json<WeatherReport>, ApiError> {
    record_request("weather");

    match state.weather.resolve_weather(location).await {
        Ok(report) => {
            info!(
                lat = location.latitude,
                lon = location.longitude,
                weather = %report.weather,
                forecast_timestamp = %report.details.forecast_timestamp,
                "Weather lookup"
            );
            Ok(Json(report))
        }
        Err(e) => {
            warn!(lat = location.latitude, lon = location.longitude, error = %e, "Weather lookup failed");
            record_error("weather", e.error_code());
            Err(e.into())
        }
    }
}
