//! PaddleOCR-style JSON output
//!
//! PaddleOCR reports each detection as `[box, [text, confidence]]` where
//! `box` is a four-point polygon. Results may be wrapped in a per-page list,
//! with `null` for pages that had no text.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use sw_core::RecognizedFragment;
use tokio::process::Command;

use crate::{run_engine, OcrEngine, OcrError, Result};

#[derive(Debug, Deserialize)]
struct PaddleDetection(Vec<[f32; 2]>, (String, f32));

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PaddleOutput {
    Pages(Vec<Option<Vec<PaddleDetection>>>),
    Detections(Vec<PaddleDetection>),
}

/// Parse PaddleOCR JSON into fragments, keeping only the first box
/// point's Y coordinate and the text.
pub fn parse_paddle_json(json: &str) -> Result<Vec<RecognizedFragment>> {
    let output: PaddleOutput =
        serde_json::from_str(json).map_err(|e| OcrError::InvalidOutput(e.to_string()))?;

    let detections: Vec<PaddleDetection> = match output {
        PaddleOutput::Pages(pages) => pages.into_iter().flatten().flatten().collect(),
        PaddleOutput::Detections(detections) => detections,
    };

    Ok(detections
        .into_iter()
        .filter_map(|PaddleDetection(polygon, (text, confidence))| {
            let first = polygon.first()?;
            Some(RecognizedFragment::new(text, first[1]).with_confidence(confidence))
        })
        .collect())
}

/// OCR engine backed by an external command.
///
/// The image path is appended to the configured arguments and the command
/// must print PaddleOCR JSON on stdout.
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl OcrEngine for CommandEngine {
    async fn recognize_file(&self, image_path: &Path) -> Result<Vec<RecognizedFragment>> {
        let output = run_engine(Command::new(&self.program).args(&self.args).arg(image_path))
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    OcrError::EngineNotAvailable(format!("{} not found", self.program))
                }
                _ => OcrError::ExecutionFailed(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ExecutionFailed(format!(
                "{} failed: {stderr}",
                self.program
            )));
        }

        parse_paddle_json(&String::from_utf8_lossy(&output.stdout))
    }

    async fn is_available(&self) -> bool {
        which(&self.program)
    }

    fn name(&self) -> &str {
        "command"
    }
}

fn which(program: &str) -> bool {
    let path = Path::new(program);
    if path.components().count() > 1 {
        return path.is_file();
    }

    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}
