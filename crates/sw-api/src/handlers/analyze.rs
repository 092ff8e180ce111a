//! Screenshot analysis handlers

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use sw_core::{CategoryResult, PhotoRef, RecognizedFragment};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, AppError};
use crate::state::AppState;

/// Single-image request body
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageRequest {
    /// Image URL
    #[schema(example = "https://cdn.example.com/shots/IMG_0412.png")]
    #[serde(default)]
    pub image_url: String,
}

/// Batch request body
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImagesRequest {
    /// Image URLs, analysed independently
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// One batch entry: a category result or an error descriptor
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CategoryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// Batch response, one entry per input in input order
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchResponse {
    pub results: Vec<BatchEntry>,
}

/// Fragment analysis request body
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeFragmentsRequest {
    /// OCR fragments in engine scan order
    pub fragments: Vec<RecognizedFragment>,
    /// Image the fragments came from, used for photoName/photoUrl
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Fetch, recognize and classify one image
async fn analyze_one(state: &AppState, image_url: &str) -> Result<CategoryResult, AppError> {
    let image_url = image_url.trim();
    if image_url.is_empty() {
        return Err(AppError::BadRequest("imageUrl is required".to_string()));
    }

    let request_id = Uuid::new_v4();
    let started = Instant::now();
    tracing::debug!(%request_id, image_url, "Fetching image");

    let image = state.fetcher.fetch(image_url).await?;
    let fragments =
        sw_ocr::recognize_with_timeout(state.ocr.clone(), image, state.ocr_timeout).await?;

    let photo = PhotoRef::from_url(image_url);
    let result = state.pipeline.analyze_fragments(&fragments, &photo);

    tracing::info!(
        %request_id,
        image_url,
        fragments = fragments.len(),
        category = %result.category(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Analyzed image"
    );

    Ok(result)
}

fn record(state: &AppState, outcome: &Result<CategoryResult, AppError>) {
    match outcome {
        Ok(result) => state.categories.record(result.category()),
        Err(e) => {
            tracing::warn!(error = %e, "Image analysis failed");
            state.categories.record_failure();
        }
    }
}

/// Analyze a single screenshot
#[utoipa::path(
    post,
    path = "/analyze_image",
    tag = "analysis",
    request_body = AnalyzeImageRequest,
    responses(
        (status = 200, description = "Category result", body = CategoryResult),
        (status = 400, description = "Missing URL or image could not be fetched", body = ApiError),
        (status = 502, description = "OCR failed", body = ApiError),
        (status = 504, description = "Analysis timed out", body = ApiError)
    )
)]
pub async fn analyze_image(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeImageRequest>,
) -> Result<Json<CategoryResult>, AppError> {
    state.increment_requests();

    let outcome = analyze_one(&state, &request.image_url).await;
    record(&state, &outcome);

    outcome.map(Json)
}

/// Analyze several screenshots; failures are reported per entry
#[utoipa::path(
    post,
    path = "/analyze_images",
    tag = "analysis",
    request_body = AnalyzeImagesRequest,
    responses(
        (status = 200, description = "One entry per input, in input order", body = BatchResponse),
        (status = 400, description = "Batch too large", body = ApiError)
    )
)]
pub async fn analyze_images(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeImagesRequest>,
) -> Result<Json<BatchResponse>, AppError> {
    state.increment_requests();

    let max = state.config.server.max_batch_size;
    if request.image_urls.len() > max {
        return Err(AppError::BadRequest(format!(
            "at most {max} images per batch, got {}",
            request.image_urls.len()
        )));
    }

    let outcomes = join_all(
        request
            .image_urls
            .iter()
            .map(|url| analyze_one(&state, url)),
    )
    .await;

    let results = request
        .image_urls
        .into_iter()
        .zip(outcomes)
        .map(|(image_url, outcome)| {
            record(&state, &outcome);
            match outcome {
                Ok(result) => BatchEntry {
                    image_url,
                    result: Some(result),
                    error: None,
                },
                Err(e) => BatchEntry {
                    image_url,
                    result: None,
                    error: Some(e.to_api_error()),
                },
            }
        })
        .collect();

    Ok(Json(BatchResponse { results }))
}

/// Classify OCR fragments supplied by the client
#[utoipa::path(
    post,
    path = "/analyze_fragments",
    tag = "analysis",
    request_body = AnalyzeFragmentsRequest,
    responses(
        (status = 200, description = "Category result", body = CategoryResult)
    )
)]
pub async fn analyze_fragments(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeFragmentsRequest>,
) -> Json<CategoryResult> {
    state.increment_requests();

    let photo = request
        .image_url
        .map(PhotoRef::from_url)
        .unwrap_or_else(|| PhotoRef::new("", ""));
    let result = state.pipeline.analyze_fragments(&request.fragments, &photo);
    state.categories.record(result.category());

    Json(result)
}
