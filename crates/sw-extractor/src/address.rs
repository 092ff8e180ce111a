//! Address extraction
//!
//! Korean addresses start with a top-level administrative region, followed
//! by a short locality name and optional building/road parts.

use once_cell::sync::Lazy;
use regex::Regex;

/// "장소" (place) and "주소" (address) labels with an optional colon
static MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:장소|주소)\b\s*:?\s*").expect("marker pattern is valid"));

static FULL_ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\b(?:서울|부산|대구|인천|광주|대전|울산|경기|경상|전라|충청|제주도)\b", // region (required)
        r"\s*[^\s]{1,4}",                                                          // locality
        r"\s*(?:\d+)?",                                                            // building number
        r"\s*(?:\S*)?",                                                            // remaining address
        r"(?:\s+(?:로|길))?",                                                      // road suffix
        r"\s*(?:\d*)",                                                             // trailing number
    ))
    .expect("address pattern is valid")
});

static REGION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:서울시|서울|부산|대구|인천|광주|대전|울산|경기|경상|전라|충청|제주도)\b")
        .expect("region pattern is valid")
});

/// Pattern-based address extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressExtractor;

impl AddressExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Return the first address in `text`.
    ///
    /// Tries a full region + locality match first and falls back to the
    /// region name on its own.
    pub fn extract(&self, text: &str) -> Option<String> {
        let text = MARKER_RE.replace_all(text, "");
        let text = text.trim().trim_start_matches(':').trim();

        if let Some(found) = FULL_ADDRESS_RE.find(text) {
            let address = found.as_str().trim().trim_start_matches(':').trim();
            if !address.is_empty() {
                return Some(address.to_string());
            }
        }

        REGION_RE
            .find(text)
            .map(|found| found.as_str().trim().to_string())
    }

    /// Extract at most one address per line
    pub fn extract_lines<'a, I>(&self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines.into_iter().filter_map(|line| self.extract(line)).collect()
    }
}
