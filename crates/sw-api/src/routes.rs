//! API route definitions

use crate::handlers::{analyze, health};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Analysis routes
pub fn analysis_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analyze_image", post(analyze::analyze_image))
        .route("/analyze_images", post(analyze::analyze_images))
        .route("/analyze_fragments", post(analyze::analyze_fragments))
}

/// Liveness, readiness and metrics routes
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
}
