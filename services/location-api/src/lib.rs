//! Location API Service Library
//!
//! HTTP service answering "what is the weather / rainfall here" from the
//! Japan Meteorological Agency's published raster tiles.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod service;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Lookups
        .route(
            "/location_weather_forecast",
            post(handlers::forecast::location_weather_forecast_handler),
        )
        .route(
            "/location_rainfall",
            post(handlers::rainfall::location_rainfall_handler),
        )
        // Health and metrics
        .route("/healthcheck", get(handlers::health::healthcheck_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
