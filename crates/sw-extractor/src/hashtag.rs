//! Hashtag splitting
//!
//! Screenshots of social posts end with `#tag` runs. They are pulled out of
//! the body before field extraction and kept for the place summary.

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regex::Regex;

static HASHTAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#\S+").expect("hashtag pattern is valid"));

/// Body text with hashtags removed, plus the hashtags in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitText {
    pub body: String,
    pub hashtags: Vec<String>,
}

/// Separates hashtag tokens from body text
#[derive(Debug, Clone, Copy, Default)]
pub struct HashtagSplitter;

impl HashtagSplitter {
    pub fn new() -> Self {
        Self
    }

    /// Remove every `#` + non-whitespace run and trim the result.
    ///
    /// Spacing inside the body is left as is. A removed run always ends at
    /// whitespace or end of text, so re-running on the body changes nothing.
    pub fn split(&self, text: &str) -> SplitText {
        let mut hashtags: Vec<String> = Vec::new();
        for tag in HASHTAG_RE.find_iter(text) {
            let tag = tag.as_str().to_string();
            if !hashtags.contains(&tag) {
                hashtags.push(tag);
            }
        }

        let body = HASHTAG_RE.replace_all(text, "").trim().to_string();

        SplitText { body, hashtags }
    }
}

/// Picks the hashtag shown as the place summary
#[derive(Debug, Clone, Copy, Default)]
pub enum HashtagChooser {
    /// Uniformly random per call
    #[default]
    Random,
    /// Reproducible choice from a fixed seed
    Seeded(u64),
}

impl HashtagChooser {
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map(Self::Seeded).unwrap_or(Self::Random)
    }

    pub fn choose<'a>(&self, hashtags: &'a [String]) -> Option<&'a str> {
        let picked = match self {
            Self::Random => hashtags.choose(&mut rand::thread_rng()),
            Self::Seeded(seed) => hashtags.choose(&mut StdRng::seed_from_u64(*seed)),
        };
        picked.map(|tag| tag.trim())
    }
}
