//! Screenwiper API - HTTP server
//!
//! Fetches screenshots, runs OCR and returns the classified, structured
//! content of each image.

pub mod error;
pub mod fetch;
pub mod handlers;
pub mod routes;
pub mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::handlers::{analyze, health};
use crate::state::AppState;

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness_check,
        health::metrics,
        analyze::analyze_image,
        analyze::analyze_images,
        analyze::analyze_fragments,
    ),
    components(schemas(
        error::ApiError,
        health::HealthResponse,
        health::BuildInfo,
        health::ReadinessResponse,
        health::ReadinessChecks,
        health::MetricsResponse,
        health::CategoryCounts,
        analyze::AnalyzeImageRequest,
        analyze::AnalyzeImagesRequest,
        analyze::AnalyzeFragmentsRequest,
        analyze::BatchEntry,
        analyze::BatchResponse,
        sw_core::RecognizedFragment,
        sw_core::EventRecord,
        sw_core::PlaceResponse,
        sw_core::EventResponse,
        sw_core::NoteResponse,
        sw_core::CategoryResult,
    )),
    tags(
        (name = "analysis", description = "Screenshot analysis"),
        (name = "health", description = "Liveness, readiness and metrics")
    )
)]
pub struct ApiDoc;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .merge(routes::health_routes())
        .merge(routes::analysis_routes())
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(TraceLayer::new_for_http());

    if state.config.server.cors_enabled {
        router = router.layer(cors_layer(&state.config.server.cors_origins));
    }

    router.with_state(state)
}

/// Router backed by stub OCR and fetcher
#[cfg(any(test, feature = "test-utils"))]
pub fn create_router_for_testing() -> Router {
    create_router(Arc::new(testing::test_state(testing::StubOcr::event_poster())))
}
