//! Screenwiper Extractor - Screenshot text analysis
//!
//! Groups OCR fragments into lines, pulls out hashtags, addresses,
//! operating hours and event date ranges, classifies the screenshot and
//! builds the category-specific result.
//!
//! # Example
//!
//! ```
//! use sw_core::{Category, PhotoRef, PipelineConfig};
//! use sw_extractor::Pipeline;
//!
//! let pipeline = Pipeline::with_defaults(&PipelineConfig::default());
//! let photo = PhotoRef::from_url("https://cdn.example.com/a.png");
//! let result = pipeline.analyze_text("전시명\n2024-05-01 - 2024-05-10", &photo);
//!
//! assert_eq!(result.category(), Category::Event);
//! ```

pub mod address;
pub mod classify;
pub mod dates;
pub mod event;
pub mod hashtag;
pub mod hours;
pub mod keywords;
pub mod lines;
pub mod pipeline;
pub mod response;

pub use address::AddressExtractor;
pub use classify::{Classifier, Extraction};
pub use dates::DateParser;
pub use event::EventExtractor;
pub use hashtag::{HashtagChooser, HashtagSplitter, SplitText};
pub use hours::{HoursShape, OperatingHoursExtractor};
pub use keywords::{strip_digits, top_keywords, KeySentenceSummarizer, WordRankConfig, WordRankExtractor};
pub use lines::{LineGrouper, DEFAULT_TOLERANCE};
pub use pipeline::Pipeline;
pub use response::ResponseBuilder;
