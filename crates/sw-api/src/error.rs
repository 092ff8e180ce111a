//! API error handling

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sw_ocr::OcrError;
use utoipa::ToSchema;

use crate::fetch::FetchError;

/// API error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    #[schema(example = "FETCH_FAILED")]
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Malformed request or missing image reference
    BadRequest(String),
    /// Image could not be downloaded or decoded
    FetchFailed(String),
    /// OCR did not finish within the configured bound
    AnalysisTimeout(Duration),
    /// OCR engine failed or is unavailable
    Ocr(String),
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::FetchFailed(_) => StatusCode::BAD_REQUEST,
            AppError::AnalysisTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Ocr(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body shared by the single-image response and batch entries
    pub fn to_api_error(&self) -> ApiError {
        match self {
            AppError::BadRequest(msg) => ApiError::bad_request(msg.clone()),
            AppError::FetchFailed(msg) => {
                ApiError::new("FETCH_FAILED", "Image could not be fetched").with_details(msg.clone())
            }
            AppError::AnalysisTimeout(limit) => {
                ApiError::new("ANALYSIS_TIMEOUT", format!("Analysis timed out after {limit:?}"))
            }
            AppError::Ocr(msg) => {
                ApiError::new("OCR_FAILED", "Text recognition failed").with_details(msg.clone())
            }
            AppError::Internal(msg) => ApiError::internal_error().with_details(msg.clone()),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let error = self.to_api_error();
        match error.details {
            Some(details) => write!(f, "{}: {details}", error.message),
            None => write!(f, "{}", error.message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_api_error())).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::FetchFailed(err.to_string())
    }
}

impl From<OcrError> for AppError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::Timeout(limit) => AppError::AnalysisTimeout(limit),
            other => AppError::Ocr(other.to_string()),
        }
    }
}
