//! Application state management

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use sw_core::{AppConfig, Category};
use sw_extractor::Pipeline;
use sw_ocr::{OcrEngine, OcrManager};

use crate::fetch::{FetchError, HttpImageFetcher, ImageFetcher};

/// Per-category analysis counters
#[derive(Debug, Default)]
pub struct CategoryCounters {
    place: AtomicU64,
    event: AtomicU64,
    note: AtomicU64,
    failed: AtomicU64,
}

impl CategoryCounters {
    pub fn record(&self, category: Category) {
        let counter = match category {
            Category::Place => &self.place,
            Category::Event => &self.event,
            Category::Note => &self.note,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, category: Category) -> u64 {
        match category {
            Category::Place => self.place.load(Ordering::Relaxed),
            Category::Event => self.event.load(Ordering::Relaxed),
            Category::Note => self.note.load(Ordering::Relaxed),
        }
    }

    pub fn failures(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Analysis outcomes
    pub categories: CategoryCounters,
    /// OCR engine, loaded once at startup
    pub ocr: Arc<dyn OcrEngine>,
    /// Image source
    pub fetcher: Arc<dyn ImageFetcher>,
    /// Text analysis pipeline
    pub pipeline: Arc<Pipeline>,
    /// Upper bound for one OCR call
    pub ocr_timeout: Duration,
}

impl AppState {
    /// Create state with the OCR engine and HTTP fetcher selected by `config`
    pub fn new(config: AppConfig) -> Result<Self, FetchError> {
        let ocr: Arc<dyn OcrEngine> = Arc::new(OcrManager::from_config(&config.ocr));
        let fetcher: Arc<dyn ImageFetcher> = Arc::new(HttpImageFetcher::new(&config.fetch)?);
        Ok(Self::with_components(config, ocr, fetcher))
    }

    /// Create state with explicit collaborators
    pub fn with_components(
        config: AppConfig,
        ocr: Arc<dyn OcrEngine>,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        let pipeline = Arc::new(Pipeline::with_defaults(&config.pipeline));
        let ocr_timeout = Duration::from_secs(config.ocr.timeout_secs);

        Self {
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            categories: CategoryCounters::default(),
            ocr,
            fetcher,
            pipeline,
            ocr_timeout,
        }
    }

    pub fn with_ocr_timeout(mut self, timeout: Duration) -> Self {
        self.ocr_timeout = timeout;
        self
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_counters() {
        let counters = CategoryCounters::default();
        counters.record(Category::Event);
        counters.record(Category::Event);
        counters.record(Category::Note);
        counters.record_failure();

        assert_eq!(counters.get(Category::Event), 2);
        assert_eq!(counters.get(Category::Note), 1);
        assert_eq!(counters.get(Category::Place), 0);
        assert_eq!(counters.failures(), 1);
    }
}
