//! Screenwiper CLI - Command-line interface
//!
//! Usage:
//!   screenwiper analyze <image>
//!   screenwiper classify <text-file|->
//!   screenwiper fragments <ocr-json>

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use sw_core::{AppConfig, CategoryResult, PhotoRef, RecognizedFragment};
use sw_extractor::Pipeline;
use sw_ocr::{OcrEngine, OcrManager};

#[derive(Parser)]
#[command(name = "screenwiper")]
#[command(about = "Classify screenshots into places, events and notes")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log pipeline decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run OCR on a local image and classify it
    Analyze {
        /// Path to the image
        image: PathBuf,
    },
    /// Classify already-recognized text, one logical line per line
    Classify {
        /// Text file, or `-` for stdin
        input: String,
    },
    /// Classify a saved OCR dump (fragment list or PaddleOCR JSON)
    Fragments {
        /// Path to the JSON file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    let pipeline = Pipeline::with_defaults(&config.pipeline);

    let result = match cli.command {
        Commands::Analyze { image } => {
            let bytes = std::fs::read(&image)
                .with_context(|| format!("reading image {}", image.display()))?;

            let manager = OcrManager::from_config(&config.ocr);
            tracing::debug!(engines = ?manager.engine_names(), "OCR engines");
            let engine: Arc<dyn OcrEngine> = Arc::new(manager);
            let timeout = Duration::from_secs(config.ocr.timeout_secs);

            let fragments = sw_ocr::recognize_with_timeout(engine, bytes, timeout).await?;
            pipeline.analyze_fragments(&fragments, &photo_for(&image))
        }
        Commands::Classify { input } => {
            let text = read_input(&input)?;
            let photo = if input == "-" {
                PhotoRef::new("stdin", "")
            } else {
                photo_for(Path::new(&input))
            };
            pipeline.analyze_text(&text, &photo)
        }
        Commands::Fragments { path } => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let fragments = parse_fragments(&json)?;
            pipeline.analyze_fragments(&fragments, &photo_for(&path))
        }
    };

    print_result(&result, cli.pretty)
}

fn photo_for(path: &Path) -> PhotoRef {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    PhotoRef::new(name, path.display().to_string())
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    std::fs::read_to_string(input).with_context(|| format!("reading {input}"))
}

/// Accept either a `[{text, topLeftY, confidence}]` list or PaddleOCR output
fn parse_fragments(json: &str) -> anyhow::Result<Vec<RecognizedFragment>> {
    if let Ok(fragments) = serde_json::from_str::<Vec<RecognizedFragment>>(json) {
        return Ok(fragments);
    }
    match sw_ocr::parse_paddle_json(json) {
        Ok(fragments) => Ok(fragments),
        Err(e) => bail!("unrecognized OCR dump: {e}"),
    }
}

fn print_result(result: &CategoryResult, pretty: bool) -> anyhow::Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{output}");
    Ok(())
}
