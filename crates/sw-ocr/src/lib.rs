//! screenwiper OCR - Optical Character Recognition integration
//!
//! Turns screenshot images into positioned text fragments using
//! Tesseract or an external PaddleOCR-compatible command.

pub mod paddle;
pub mod tesseract;

pub use paddle::{parse_paddle_json, CommandEngine};
pub use tesseract::{parse_tsv, TesseractConfig, TesseractEngine};

use std::path::Path;
use std::process::{Output, Stdio};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sw_core::{OcrConfig, OcrEngineKind, RecognizedFragment};
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR engine not available: {0}")]
    EngineNotAvailable(String),

    #[error("OCR execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Invalid OCR output: {0}")]
    InvalidOutput(String),

    #[error("OCR timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OcrError>;

/// Trait for OCR engines
///
/// Engines are loaded once and shared across requests, so implementations
/// must not keep per-call state. Engines that run a child process must
/// spawn it through [`run_engine`] so that a dropped call kills the child.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognize text fragments in an image file, in engine scan order
    async fn recognize_file(&self, image_path: &Path) -> Result<Vec<RecognizedFragment>>;

    /// Recognize text fragments in an in-memory image
    async fn recognize(&self, image: &[u8]) -> Result<Vec<RecognizedFragment>> {
        let file = tempfile::NamedTempFile::new()?;
        tokio::fs::write(file.path(), image).await?;
        self.recognize_file(file.path()).await
    }

    /// Check if the engine is available on the system
    async fn is_available(&self) -> bool;

    /// Get the engine name
    fn name(&self) -> &str;
}

/// Run an engine process to completion and collect its output.
///
/// The child is killed when the returned future is dropped before it exits.
pub async fn run_engine(command: &mut Command) -> std::io::Result<Output> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    command.spawn()?.wait_with_output().await
}

/// Run an OCR call bounded by `timeout`.
///
/// On timeout the call is dropped, which kills any engine process it started.
pub async fn recognize_with_timeout(
    engine: Arc<dyn OcrEngine>,
    image: Vec<u8>,
    timeout: Duration,
) -> Result<Vec<RecognizedFragment>> {
    match tokio::time::timeout(timeout, engine.recognize(&image)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "OCR call timed out");
            Err(OcrError::Timeout(timeout))
        }
    }
}

// ============================================================================
// OCR Manager
// ============================================================================

/// OCR manager that handles multiple engines
pub struct OcrManager {
    engines: Vec<Box<dyn OcrEngine>>,
}

impl OcrManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self {
            engines: Vec::new(),
        }
    }

    /// Create a manager with the engine selected in `config`
    pub fn from_config(config: &OcrConfig) -> Self {
        let mut manager = Self::new();

        match config.engine {
            OcrEngineKind::Tesseract => {
                let mut tesseract = TesseractConfig::default().with_language(&config.language);
                if let Some(psm) = config.psm {
                    tesseract = tesseract.with_psm(psm);
                }
                if let Some(path) = &config.tesseract_path {
                    tesseract = tesseract.with_executable(path);
                }
                manager.register(TesseractEngine::with_config(tesseract));
            }
            OcrEngineKind::Command => {
                manager.register(CommandEngine::new(&config.command, config.args.clone()));
            }
        }

        manager
    }

    /// Register an OCR engine
    pub fn register<E: OcrEngine + 'static>(&mut self, engine: E) {
        self.engines.push(Box::new(engine));
    }

    /// Get registered engine names
    pub fn engine_names(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.name()).collect()
    }

    async fn first_available(&self) -> Result<&dyn OcrEngine> {
        for engine in &self.engines {
            if engine.is_available().await {
                return Ok(engine.as_ref());
            }
        }
        Err(OcrError::EngineNotAvailable(
            "No OCR engines available".to_string(),
        ))
    }
}

impl Default for OcrManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrEngine for OcrManager {
    async fn recognize_file(&self, image_path: &Path) -> Result<Vec<RecognizedFragment>> {
        self.first_available().await?.recognize_file(image_path).await
    }

    async fn recognize(&self, image: &[u8]) -> Result<Vec<RecognizedFragment>> {
        self.first_available().await?.recognize(image).await
    }

    async fn is_available(&self) -> bool {
        self.first_available().await.is_ok()
    }

    fn name(&self) -> &str {
        "manager"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEngine {
        fragments: Vec<RecognizedFragment>,
        delay: Duration,
    }

    #[async_trait]
    impl OcrEngine for FixedEngine {
        async fn recognize_file(&self, _image_path: &Path) -> Result<Vec<RecognizedFragment>> {
            tokio::time::sleep(self.delay).await;
            Ok(self.fragments.clone())
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct MissingEngine;

    #[async_trait]
    impl OcrEngine for MissingEngine {
        async fn recognize_file(&self, _image_path: &Path) -> Result<Vec<RecognizedFragment>> {
            Err(OcrError::EngineNotAvailable("missing".to_string()))
        }

        async fn is_available(&self) -> bool {
            false
        }

        fn name(&self) -> &str {
            "missing"
        }
    }

    #[tokio::test]
    async fn test_manager_skips_unavailable_engines() {
        let mut manager = OcrManager::new();
        manager.register(MissingEngine);
        manager.register(FixedEngine {
            fragments: vec![RecognizedFragment::new("전시", 10.0)],
            delay: Duration::ZERO,
        });

        assert!(manager.is_available().await);
        assert_eq!(manager.engine_names(), vec!["missing", "fixed"]);

        let fragments = manager.recognize(b"not really an image").await.unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].text, "전시");
    }

    #[tokio::test]
    async fn test_empty_manager() {
        let manager = OcrManager::new();
        assert!(!manager.is_available().await);
        assert!(matches!(
            manager.recognize(b"").await,
            Err(OcrError::EngineNotAvailable(_))
        ));
    }

    #[test]
    fn test_manager_from_config() {
        let manager = OcrManager::from_config(&OcrConfig::default());
        assert_eq!(manager.engine_names(), vec!["tesseract"]);

        let config = OcrConfig {
            engine: OcrEngineKind::Command,
            ..Default::default()
        };
        assert_eq!(OcrManager::from_config(&config).engine_names(), vec!["command"]);
    }

    #[tokio::test]
    async fn test_manager_uses_configured_tesseract_path() {
        let config = OcrConfig {
            tesseract_path: Some("/definitely/not/here/tesseract".to_string()),
            ..Default::default()
        };
        let manager = OcrManager::from_config(&config);

        assert!(!manager.is_available().await);
        assert!(matches!(
            manager.recognize(b"").await,
            Err(OcrError::EngineNotAvailable(_))
        ));
    }

    #[tokio::test]
    async fn test_recognize_with_timeout_ok() {
        let engine: Arc<dyn OcrEngine> = Arc::new(FixedEngine {
            fragments: vec![RecognizedFragment::new("영업시간", 0.0)],
            delay: Duration::ZERO,
        });

        let fragments = recognize_with_timeout(engine, vec![1, 2, 3], Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(fragments[0].text, "영업시간");
    }

    #[tokio::test]
    async fn test_recognize_with_timeout_expires() {
        let engine: Arc<dyn OcrEngine> = Arc::new(FixedEngine {
            fragments: vec![],
            delay: Duration::from_millis(500),
        });

        let result = recognize_with_timeout(engine, vec![], Duration::from_millis(20)).await;
        assert!(matches!(result, Err(OcrError::Timeout(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_engine_process() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("finished");

        // The image path lands in $1 and is ignored
        let script = format!("sleep 1 && touch {}", marker.display());
        let engine: Arc<dyn OcrEngine> = Arc::new(CommandEngine::new(
            "sh",
            vec!["-c".to_string(), script, "sh".to_string()],
        ));

        let started = std::time::Instant::now();
        let result = recognize_with_timeout(engine, vec![0u8; 4], Duration::from_millis(200)).await;
        assert!(matches!(result, Err(OcrError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_millis(900));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists(), "engine process outlived the timeout");
    }
}
