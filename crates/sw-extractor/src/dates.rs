//! Multi-format date parsing
//!
//! Every recognized date token is normalized to `YYYY-MM-DD`. Formats are
//! tried in a fixed order and the first one that parses wins.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// Output format for normalized dates
pub const NORMALIZED_FORMAT: &str = "%Y-%m-%d";

/// A supported input format.
///
/// `shape` guards the chrono format so that short years are never read by
/// a four-digit-year format and vice versa.
struct DateFormat {
    shape: Regex,
    pattern: &'static str,
}

impl DateFormat {
    fn new(shape: &str, pattern: &'static str) -> Self {
        Self {
            shape: Regex::new(shape).expect("date shape pattern is valid"),
            pattern,
        }
    }
}

static FORMATS: Lazy<Vec<DateFormat>> = Lazy::new(|| {
    vec![
        DateFormat::new(r"^\d{4}-\d{1,2}-\d{1,2}$", "%Y-%m-%d"),
        DateFormat::new(r"^\d{1,2}/\d{1,2}/\d{4}$", "%d/%m/%Y"),
        DateFormat::new(r"^\d{1,2}\.\d{1,2}\.\d{4}$", "%d.%m.%Y"),
        DateFormat::new(r"^\d{2}-\d{1,2}-\d{1,2}$", "%y-%m-%d"),
        DateFormat::new(r"^\d{4}년\s*\d{1,2}월\s*\d{1,2}일$", "%Y년 %m월 %d일"),
        DateFormat::new(r"^\d{8}$", "%Y%m%d"),
    ]
});

/// Shared date-token parser
#[derive(Debug, Clone, Copy, Default)]
pub struct DateParser;

impl DateParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a date token in any supported format
    pub fn parse(&self, token: &str) -> Option<NaiveDate> {
        let token = token.trim();
        FORMATS
            .iter()
            .filter(|format| format.shape.is_match(token))
            .find_map(|format| NaiveDate::parse_from_str(token, format.pattern).ok())
    }

    /// Parse and format as `YYYY-MM-DD`; `None` for unparsable tokens
    pub fn normalize(&self, token: &str) -> Option<String> {
        self.parse(token)
            .map(|date| date.format(NORMALIZED_FORMAT).to_string())
    }

    /// Input formats in the order they are tried
    pub fn supported_formats() -> Vec<&'static str> {
        FORMATS.iter().map(|format| format.pattern).collect()
    }
}
