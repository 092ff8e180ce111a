//! Event extraction
//!
//! Finds start/end date pairs on each logical line and names the event
//! after the line above it, which is where screenshot layouts usually put
//! the title.

use once_cell::sync::Lazy;
use regex::Regex;
use sw_core::EventRecord;

use crate::dates::DateParser;

/// Date-pair shapes, tried in this order on every line
static DATE_PAIR_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    let pair = |token: &str| format!(r"(?P<start>{token})\s*[-~]?\s*(?P<end>{token})");
    vec![
        ("plain", pair(r"\b\d{4}-\d{1,2}-\d{1,2}\b")),
        ("compact", pair(r"\b\d{8}\b")),
        ("korean", pair(r"\d{4}년\s*\d{1,2}월\s*\d{1,2}일")),
    ]
    .into_iter()
    .map(|(name, pattern)| {
        (
            name,
            Regex::new(&pattern).expect("date pair pattern is valid"),
        )
    })
    .collect()
});

/// Pattern-based event extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct EventExtractor {
    dates: DateParser,
}

impl EventExtractor {
    pub fn new() -> Self {
        Self {
            dates: DateParser::new(),
        }
    }

    /// Extract events from newline-separated text
    pub fn extract_text(&self, text: &str) -> Vec<EventRecord> {
        let lines: Vec<&str> = text.lines().collect();
        self.extract_lines(&lines)
    }

    /// Extract events from logical lines; each date pair yields one record
    pub fn extract_lines(&self, lines: &[&str]) -> Vec<EventRecord> {
        let mut events = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            let previous = index
                .checked_sub(1)
                .map(|i| lines[i].trim())
                .unwrap_or_default();
            events.extend(self.extract_line(previous, line));
        }

        events
    }

    /// Extract events from one line given the line above it
    pub fn extract_line(&self, previous: &str, line: &str) -> Vec<EventRecord> {
        let mut found: Vec<(usize, String, String)> = Vec::new();
        let mut remainder = line.to_string();

        for (shape, pattern) in DATE_PAIR_PATTERNS.iter() {
            for caps in pattern.captures_iter(line) {
                let start = self.dates.normalize(&caps["start"]);
                let end = self.dates.normalize(&caps["end"]);

                match (start, end) {
                    (Some(start), Some(end)) => {
                        let position = caps.get(0).map(|m| m.start()).unwrap_or_default();
                        found.push((position, start, end));
                    }
                    _ => {
                        tracing::debug!(shape, matched = &caps[0], "unparsable date pair skipped");
                    }
                }
            }
            remainder = pattern.replace_all(&remainder, " ").into_owned();
        }

        if found.is_empty() {
            return Vec::new();
        }
        found.sort_by_key(|(position, _, _)| *position);

        let name = event_name(previous, &remainder);
        found
            .into_iter()
            .map(|(_, start, end)| EventRecord::new(name.clone(), &start, &end))
            .collect()
    }
}

/// Previous line plus whatever text is left on the date line.
///
/// Leftovers without any letters or digits (stray brackets, dashes) are
/// ignored.
fn event_name(previous: &str, remainder: &str) -> String {
    let remainder = remainder.split_whitespace().collect::<Vec<_>>().join(" ");
    let remainder = if remainder.chars().any(char::is_alphanumeric) {
        remainder
    } else {
        String::new()
    };

    [previous.trim(), remainder.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_on_previous_line() {
        let events = EventExtractor::new().extract_text("전시명\n2024-05-01 - 2024-05-10");

        assert_eq!(events.len(), 1);
        assert!(events[0].name.contains("전시명"));
        assert_eq!(events[0].date, "2024-05-01 - 2024-05-10");
    }

    #[test]
    fn test_compact_pair_with_noise() {
        let text = "2/길드는서로들\n전시\n[ 20240410 -20240707\n서울 관악구 남부순환로 2076";
        let events = EventExtractor::new().extract_text(text);

        assert_eq!(events, vec![EventRecord::new("전시", "2024-04-10", "2024-07-07")]);
    }

    #[test]
    fn test_same_line_text_appended() {
        let events =
            EventExtractor::new().extract_text("까르띠에 시간의 결정\n20240501 - 20240630 DDP 아트홀");

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "까르띠에 시간의 결정 DDP 아트홀");
        assert_eq!(events[0].date, "2024-05-01 - 2024-06-30");
    }

    #[test]
    fn test_korean_long_form() {
        let events = EventExtractor::new()
            .extract_text("봄 축제\n2024년 4월 5일 ~ 2024년 4월 7일");

        assert_eq!(events, vec![EventRecord::new("봄 축제", "2024-04-05", "2024-04-07")]);
    }

    #[test]
    fn test_first_line_has_no_previous() {
        let events = EventExtractor::new().extract_text("2024-05-01~2024-05-03 플리마켓");
        assert_eq!(events, vec![EventRecord::new("플리마켓", "2024-05-01", "2024-05-03")]);
    }

    #[test]
    fn test_multiple_lines_independent() {
        let text = "전시 A\n20240425 -20240721\n전시 B\n20240502 - 20240804";
        let events = EventExtractor::new().extract_text(text);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "전시 A");
        assert_eq!(events[1].name, "전시 B");
        assert_eq!(events[1].date, "2024-05-02 - 2024-08-04");
    }

    #[test]
    fn test_unparsable_pair_skipped() {
        let extractor = EventExtractor::new();
        assert!(extractor.extract_text("행사\n20241399 - 20241401").is_empty());
        assert!(extractor.extract_text("").is_empty());
        assert!(extractor.extract_text("2024-05-01").is_empty());
    }
}
