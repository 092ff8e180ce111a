//! screenwiper configuration management
//!
//! Handles configuration from environment variables and TOML files
//! with defaults that work for local development.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::Category;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// OCR engine configuration
    pub ocr: OcrConfig,

    /// Image download configuration
    pub fetch: FetchConfig,

    /// Extraction pipeline configuration
    pub pipeline: PipelineConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env()
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.apply_env()
    }

    fn apply_env(mut self) -> Result<Self, ConfigError> {
        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = parse_env::<u16>("API_PORT")? {
            self.server.port = port;
        }

        // CORS origins from environment variable (comma-separated)
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // OCR
        if let Ok(engine) = std::env::var("OCR_ENGINE") {
            self.ocr.engine = engine.parse()?;
        }
        if let Ok(language) = std::env::var("OCR_LANGUAGE") {
            self.ocr.language = language;
        }
        if let Ok(path) = std::env::var("TESSERACT_PATH") {
            self.ocr.tesseract_path = Some(path);
        }
        if let Some(secs) = parse_env::<u64>("OCR_TIMEOUT_SECS")? {
            self.ocr.timeout_secs = secs;
        }

        // Pipeline
        if let Some(tolerance) = parse_env::<f32>("LINE_TOLERANCE")? {
            self.pipeline.line_tolerance = tolerance;
        }
        if let Some(seed) = parse_env::<u64>("HASHTAG_SEED")? {
            self.pipeline.hashtag_seed = Some(seed);
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(self)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Enable CORS
    pub cors_enabled: bool,

    /// Allowed origins for CORS
    pub cors_origins: Vec<String>,

    /// Maximum number of images accepted by the batch endpoint
    pub max_batch_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_enabled: true,
            cors_origins: vec![],
            max_batch_size: 20,
        }
    }
}

/// Supported OCR engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrEngineKind {
    /// Tesseract CLI with TSV output
    Tesseract,
    /// External command printing PaddleOCR-style JSON
    Command,
}

impl std::str::FromStr for OcrEngineKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tesseract" => Ok(Self::Tesseract),
            "command" | "paddle" => Ok(Self::Command),
            _ => Err(ConfigError::InvalidValue {
                key: "OCR_ENGINE".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// OCR engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Engine to use
    pub engine: OcrEngineKind,

    /// Language code(s) passed to the engine (e.g., "kor+eng")
    pub language: String,

    /// Tesseract page segmentation mode
    pub psm: Option<u8>,

    /// Tesseract executable; `tesseract` on PATH when unset
    pub tesseract_path: Option<String>,

    /// Program for the command engine; the image path is appended to `args`
    pub command: String,

    /// Arguments for the command engine
    pub args: Vec<String>,

    /// Upper bound for a single OCR call, in seconds
    pub timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrEngineKind::Tesseract,
            language: "kor+eng".to_string(),
            psm: None,
            tesseract_path: None,
            command: "paddleocr-json".to_string(),
            args: vec![],
            timeout_secs: 15,
        }
    }
}

/// Image download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Largest accepted image body in bytes
    pub max_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_bytes: 20 * 1024 * 1024, // 20MB
        }
    }
}

/// Reference point for the line-grouping tolerance check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineAnchor {
    /// Compare against the previous fragment; tolerance drifts along long lines
    #[default]
    Previous,
    /// Compare against the first fragment of the current line
    LineStart,
}

/// Extraction pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum vertical distance between fragments on one line
    pub line_tolerance: f32,

    /// Which fragment the tolerance is measured from
    pub line_anchor: LineAnchor,

    /// Category precedence; the first category whose extractor matched wins
    pub precedence: Vec<Category>,

    /// Seed for the hashtag summary choice (random when unset)
    pub hashtag_seed: Option<u64>,

    /// Minimum line count handed to the summarizer
    pub summary_min_sentences: usize,

    /// Number of top keywords used for titles
    pub keyword_count: usize,

    /// Place summary used when the text has no hashtags
    pub no_hashtag_summary: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 10.0,
            line_anchor: LineAnchor::Previous,
            precedence: vec![Category::Event, Category::Place],
            hashtag_seed: None,
            summary_min_sentences: 3,
            keyword_count: 3,
            no_hashtag_summary: "해쉬태그 없더".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.ocr.timeout_secs, 15);
        assert_eq!(config.pipeline.line_tolerance, 10.0);
        assert_eq!(config.pipeline.line_anchor, LineAnchor::Previous);
        assert_eq!(
            config.pipeline.precedence,
            vec![Category::Event, Category::Place]
        );
    }

    #[test]
    fn test_ocr_engine_parse() {
        assert_eq!(
            "tesseract".parse::<OcrEngineKind>().unwrap(),
            OcrEngineKind::Tesseract
        );
        assert_eq!(
            "Paddle".parse::<OcrEngineKind>().unwrap(),
            OcrEngineKind::Command
        );
        assert!("invalid".parse::<OcrEngineKind>().is_err());
    }

    #[test]
    fn test_partial_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9000

[ocr]
tesseract_path = "/opt/tesseract/bin/tesseract"

[pipeline]
line_anchor = "line_start"
precedence = ["place", "event"]
hashtag_seed = 7
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(
            config.ocr.tesseract_path.as_deref(),
            Some("/opt/tesseract/bin/tesseract")
        );
        assert_eq!(config.ocr.language, "kor+eng");
        assert_eq!(config.pipeline.line_anchor, LineAnchor::LineStart);
        assert_eq!(
            config.pipeline.precedence,
            vec![Category::Place, Category::Event]
        );
        assert_eq!(config.pipeline.hashtag_seed, Some(7));
        assert_eq!(config.pipeline.keyword_count, 3);
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::from_file("/nonexistent/screenwiper.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));
    }
}
