//! Tesseract OCR engine
//!
//! Runs the `tesseract` CLI in TSV mode and keeps one fragment per
//! recognized word.

use std::path::Path;

use async_trait::async_trait;
use sw_core::RecognizedFragment;
use tokio::process::Command;

use crate::{run_engine, OcrEngine, OcrError, Result};

/// TSV level for word rows
const WORD_LEVEL: &str = "5";

/// Tesseract OCR engine configuration
#[derive(Debug, Clone)]
pub struct TesseractConfig {
    /// Language code(s) for OCR (e.g., "eng", "kor", "kor+eng")
    pub language: String,
    /// Page segmentation mode (PSM)
    pub psm: Option<u8>,
    /// Path to tesseract executable
    pub executable_path: Option<String>,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            language: "kor+eng".to_string(),
            psm: None,
            executable_path: None,
        }
    }
}

impl TesseractConfig {
    /// Set language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set page segmentation mode
    pub fn with_psm(mut self, psm: u8) -> Self {
        self.psm = Some(psm);
        self
    }

    /// Set executable path
    pub fn with_executable(mut self, path: impl Into<String>) -> Self {
        self.executable_path = Some(path.into());
        self
    }
}

/// Tesseract OCR engine wrapper
pub struct TesseractEngine {
    config: TesseractConfig,
}

impl TesseractEngine {
    /// Create a new Tesseract engine with default config
    pub fn new() -> Self {
        Self {
            config: TesseractConfig::default(),
        }
    }

    /// Create with custom config
    pub fn with_config(config: TesseractConfig) -> Self {
        Self { config }
    }

    fn executable(&self) -> &str {
        self.config
            .executable_path
            .as_deref()
            .unwrap_or("tesseract")
    }

    fn build_args(&self, image_path: &Path) -> Vec<String> {
        let mut args = vec![
            image_path.display().to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.config.language.clone(),
        ];

        if let Some(psm) = self.config.psm {
            args.push("--psm".to_string());
            args.push(psm.to_string());
        }

        args.push("tsv".to_string());
        args
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn recognize_file(&self, image_path: &Path) -> Result<Vec<RecognizedFragment>> {
        let output = run_engine(Command::new(self.executable()).args(self.build_args(image_path)))
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => OcrError::EngineNotAvailable(
                    "Tesseract is not installed or not in PATH".to_string(),
                ),
                _ => OcrError::ExecutionFailed(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ExecutionFailed(format!(
                "Tesseract failed: {stderr}"
            )));
        }

        let fragments = parse_tsv(&String::from_utf8_lossy(&output.stdout))?;
        tracing::debug!(count = fragments.len(), "tesseract recognized fragments");
        Ok(fragments)
    }

    async fn is_available(&self) -> bool {
        run_engine(Command::new(self.executable()).arg("--version"))
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}

/// Parse Tesseract TSV output into word fragments.
///
/// Columns: level, page, block, par, line, word, left, top, width, height,
/// conf, text. Non-word rows and blank words are dropped.
pub fn parse_tsv(tsv: &str) -> Result<Vec<RecognizedFragment>> {
    let mut fragments = Vec::new();

    for (index, row) in tsv.lines().enumerate() {
        if index == 0 && row.starts_with("level") {
            continue;
        }

        let columns: Vec<&str> = row.split('\t').collect();
        if columns.len() < 12 || columns[0] != WORD_LEVEL {
            continue;
        }

        let text = columns[11..].join("\t");
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        let top: f32 = columns[7]
            .parse()
            .map_err(|_| OcrError::InvalidOutput(format!("bad top value on row {index}")))?;
        let conf: f32 = columns[10].parse().unwrap_or(-1.0);

        fragments.push(
            RecognizedFragment::new(text, top).with_confidence((conf / 100.0).clamp(0.0, 1.0)),
        );
    }

    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t800\t600\t-1\t
4\t1\t1\t1\t1\t0\t10\t20\t300\t30\t-1\t
5\t1\t1\t1\t1\t1\t10\t20\t80\t30\t96.5\t영업시간
5\t1\t1\t1\t1\t2\t95\t22\t120\t30\t91.0\t09:00-18:00
5\t1\t1\t1\t1\t3\t220\t22\t20\t30\t95.0\t
5\t1\t1\t1\t2\t1\t10\t70\t60\t30\t88.0\t주소";

    #[test]
    fn test_parse_tsv_words() {
        let fragments = parse_tsv(SAMPLE).unwrap();

        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["영업시간", "09:00-18:00", "주소"]);
        assert_eq!(fragments[1].top_left_y, 22.0);
        assert!((fragments[0].confidence - 0.965).abs() < 1e-6);
    }

    #[test]
    fn test_parse_tsv_bad_top() {
        let bad = "5\t1\t1\t1\t1\t1\t10\tx\t80\t30\t96\t전시";
        assert!(matches!(parse_tsv(bad), Err(OcrError::InvalidOutput(_))));
    }

    #[test]
    fn test_tesseract_args() {
        let engine = TesseractEngine::with_config(
            TesseractConfig::default()
                .with_language("kor")
                .with_psm(6)
                .with_executable("/usr/local/bin/tesseract"),
        );

        assert_eq!(engine.executable(), "/usr/local/bin/tesseract");
        let args = engine.build_args(Path::new("/tmp/shot.png"));
        assert_eq!(
            args,
            vec!["/tmp/shot.png", "stdout", "-l", "kor", "--psm", "6", "tsv"]
        );
        assert_eq!(engine.name(), "tesseract");
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let engine = TesseractEngine::with_config(
            TesseractConfig::default().with_executable("/definitely/not/here/tesseract"),
        );

        assert!(!engine.is_available().await);
        assert!(matches!(
            engine.recognize_file(Path::new("/tmp/shot.png")).await,
            Err(OcrError::EngineNotAvailable(_))
        ));
    }
}
