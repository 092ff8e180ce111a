//! screenwiper core - Domain models, traits, and shared types
//!
//! This crate defines the abstractions shared by every screenwiper crate:
//! - OCR fragments and the structured records extracted from them
//! - Category results returned to API and CLI callers
//! - Collaborator traits for keyword ranking and sentence summarization
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{
    AppConfig, ConfigError, FetchConfig, LineAnchor, LoggingConfig, OcrConfig, OcrEngineKind,
    PipelineConfig, ServerConfig,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for screenwiper operations
#[derive(Error, Debug)]
pub enum SwError {
    #[error("Keyword extraction error: {0}")]
    KeywordError(String),

    #[error("Summarization error: {0}")]
    SummarizationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, SwError>;

// ============================================================================
// OCR Input
// ============================================================================

/// One OCR-recognized text span.
///
/// Only the top-left Y coordinate of the bounding box is kept; line grouping
/// never looks at the horizontal position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedFragment {
    /// Recognized text
    #[schema(example = "서울 강남구")]
    pub text: String,

    /// Y coordinate of the first bounding-box point, in engine pixels
    #[schema(example = 120.0)]
    pub top_left_y: f32,

    /// Recognition confidence (0.0 - 1.0)
    #[serde(default = "default_confidence")]
    #[schema(example = 0.97)]
    pub confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

impl RecognizedFragment {
    /// Create a fragment with full confidence
    pub fn new(text: impl Into<String>, top_left_y: f32) -> Self {
        Self {
            text: text.into(),
            top_left_y,
            confidence: 1.0,
        }
    }

    /// Set confidence score
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }
}

// ============================================================================
// Categories
// ============================================================================

/// Semantic category of a screenshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Place or business information
    Place,
    /// Scheduled event(s)
    Event,
    /// Anything else
    Note,
}

impl Category {
    /// Numeric identifier used in API responses
    pub fn id(&self) -> u8 {
        match self {
            Self::Place => 1,
            Self::Event => 2,
            Self::Note => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Place => "place",
            Self::Event => "event",
            Self::Note => "note",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = SwError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "place" | "1" => Ok(Self::Place),
            "event" | "2" => Ok(Self::Event),
            "note" | "3" => Ok(Self::Note),
            other => Err(SwError::ValidationError(format!("unknown category: {other}"))),
        }
    }
}

// ============================================================================
// Extracted Records
// ============================================================================

/// One matched operating-hours range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatingHoursEntry {
    /// Day qualifier such as "매일" or "토요일"
    pub day: Option<String>,
    /// Start time, "HH:MM"
    pub start_time: String,
    /// End time, "HH:MM"
    pub end_time: String,
}

impl std::fmt::Display for OperatingHoursEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.day {
            Some(day) => write!(f, "{day} {} - {}", self.start_time, self.end_time),
            None => write!(f, "{} - {}", self.start_time, self.end_time),
        }
    }
}

/// A scheduled event found in the text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventRecord {
    /// Event name built from the surrounding lines
    #[schema(example = "까르띠에 시간의 결정")]
    pub name: String,

    /// Date range, "YYYY-MM-DD - YYYY-MM-DD"
    #[schema(example = "2024-05-01 - 2024-06-30")]
    pub date: String,
}

impl EventRecord {
    pub fn new(name: impl Into<String>, start: &str, end: &str) -> Self {
        Self {
            name: name.into(),
            date: format!("{start} - {end}"),
        }
    }
}

/// Name and URL of the analysed photo
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRef {
    pub name: String,
    pub url: String,
}

impl PhotoRef {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Build a reference whose name is the last path segment of the URL
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
        let name = path
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        Self { name, url }
    }
}

// ============================================================================
// Category Results
// ============================================================================

/// Category 1 result: place or business information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceResponse {
    #[schema(example = 1)]
    pub category_id: u8,
    #[schema(example = "카페 온더플랜")]
    pub title: String,
    #[schema(example = "서울 성동구 연무장길 41")]
    pub address: String,
    pub operating_hours: Vec<String>,
    #[schema(example = "#성수카페")]
    pub summary: String,
    pub photo_name: String,
    pub photo_url: String,
}

/// Category 2 result: list of scheduled events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    #[schema(example = 2)]
    pub category_id: u8,
    #[schema(example = "전시 서울 미술관")]
    pub title: String,
    pub list: Vec<EventRecord>,
    pub photo_name: String,
    pub photo_url: String,
}

/// Category 3 result: generic note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    #[schema(example = 3)]
    pub category_id: u8,
    pub title: String,
    pub summary: String,
    pub photo_name: String,
    pub photo_url: String,
}

/// Structured analysis result, one variant per category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CategoryResult {
    Place(PlaceResponse),
    Event(EventResponse),
    Note(NoteResponse),
}

impl CategoryResult {
    pub fn category(&self) -> Category {
        match self {
            Self::Place(_) => Category::Place,
            Self::Event(_) => Category::Event,
            Self::Note(_) => Category::Note,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Place(r) => &r.title,
            Self::Event(r) => &r.title,
            Self::Note(r) => &r.title,
        }
    }

    pub fn photo_url(&self) -> &str {
        match self {
            Self::Place(r) => &r.photo_url,
            Self::Event(r) => &r.photo_url,
            Self::Note(r) => &r.photo_url,
        }
    }
}

// ============================================================================
// Collaborator Traits
// ============================================================================

/// Candidate keywords with scores, in first-occurrence order
pub type KeywordScores = Vec<(String, f64)>;

/// Output of a sentence summarizer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    /// Keywords the summarizer ranked
    pub keywords: KeywordScores,
    /// Key sentences, in source order
    pub sentences: Vec<String>,
}

/// Keyword-ranking collaborator.
///
/// Input lines have already had digits stripped. Implementations must return
/// scores in the order each keyword first appears so callers get a stable
/// tie-break.
pub trait KeywordExtractor: Send + Sync {
    fn extract_keywords(&self, lines: &[String]) -> Result<KeywordScores>;

    /// Get extractor name for logging
    fn name(&self) -> &str;
}

/// Extractive summarization collaborator.
///
/// Fails when `lines` holds fewer than `min_sentences` usable sentences.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, lines: &[String], min_sentences: usize) -> Result<Summary>;

    /// Get summarizer name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================
