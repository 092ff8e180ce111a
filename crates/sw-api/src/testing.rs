//! In-process collaborators for router tests

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sw_core::{AppConfig, RecognizedFragment};
use sw_ocr::OcrEngine;

use crate::fetch::{FetchError, ImageFetcher};
use crate::state::AppState;

/// Fetcher serving placeholder bytes; URLs containing `fail` return 404
#[derive(Debug, Default, Clone)]
pub struct StubFetcher;

#[async_trait]
impl ImageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if url.contains("fail") {
            return Err(FetchError::Status(404));
        }
        Ok(url.as_bytes().to_vec())
    }
}

/// OCR engine returning the same fragments for every image
#[derive(Debug, Clone)]
pub struct StubOcr {
    fragments: Vec<RecognizedFragment>,
    delay: Option<Duration>,
    available: bool,
}

impl StubOcr {
    pub fn new(fragments: Vec<RecognizedFragment>) -> Self {
        Self {
            fragments,
            delay: None,
            available: true,
        }
    }

    /// Delay each call by `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Report the engine as not installed
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Fragments of an exhibition poster: title line above a date range
    pub fn event_poster() -> Self {
        Self::new(vec![
            RecognizedFragment::new("김창열 개인전", 12.0),
            RecognizedFragment::new("2024-05-01", 48.0),
            RecognizedFragment::new("-", 49.0),
            RecognizedFragment::new("2024-05-10", 50.0),
            RecognizedFragment::new("주소: 서울 종로구 삼청로 30", 90.0),
        ])
    }
}

#[async_trait]
impl OcrEngine for StubOcr {
    async fn recognize_file(&self, _image_path: &Path) -> sw_ocr::Result<Vec<RecognizedFragment>> {
        self.recognize(&[]).await
    }

    async fn recognize(&self, _image: &[u8]) -> sw_ocr::Result<Vec<RecognizedFragment>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.fragments.clone())
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// State with stub OCR and fetcher and a fixed hashtag seed
pub fn test_state(ocr: StubOcr) -> AppState {
    let mut config = AppConfig::default();
    config.pipeline.hashtag_seed = Some(42);
    config.server.max_batch_size = 5;

    AppState::with_components(config, Arc::new(ocr), Arc::new(StubFetcher))
}
