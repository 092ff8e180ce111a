//! Operating-hours extraction
//!
//! Recognizes `H:MM - H:MM` ranges, optionally preceded by a day name and
//! optionally qualified with 오전/오후 (AM/PM) markers. Matches never span
//! lines.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use sw_core::OperatingHoursEntry;

static HOURS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?:(?P<day>매일|평일|주말|월요일|화요일|수요일|목요일|금요일|토요일|일요일)[ \t]*)?",
        r"(?:(?P<sp>오전|오후)[ \t]*)?",
        r"(?P<sh>\d{1,2}):(?P<sm>\d{2})",
        r"[ \t]*[-~]?[ \t]*",
        r"(?:(?P<ep>오전|오후)[ \t]*)?",
        r"(?P<eh>\d{1,2}):(?P<em>\d{2})",
    ))
    .expect("hours pattern is valid")
});

/// Shape of a matched time range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoursShape {
    /// `09:00 - 18:00`
    Plain,
    /// `오전 9:00 - 오후 6:00`
    Meridiem,
    /// `매일 09:00 - 18:00`
    DayQualified,
}

impl HoursShape {
    fn of(caps: &Captures<'_>) -> Self {
        if caps.name("day").is_some() {
            Self::DayQualified
        } else if caps.name("sp").is_some() || caps.name("ep").is_some() {
            Self::Meridiem
        } else {
            Self::Plain
        }
    }
}

/// Pattern-based operating-hours extractor
#[derive(Debug, Clone, Copy, Default)]
pub struct OperatingHoursExtractor;

impl OperatingHoursExtractor {
    pub fn new() -> Self {
        Self
    }

    /// All ranges in `text`, in order of appearance, duplicates kept
    pub fn extract(&self, text: &str) -> Vec<OperatingHoursEntry> {
        HOURS_RE
            .captures_iter(text)
            .filter_map(|caps| {
                let entry = to_entry(&caps);
                if entry.is_none() {
                    tracing::debug!(matched = &caps[0], "skipping invalid time range");
                }
                entry
            })
            .collect()
    }

    /// Ranges formatted as `HH:MM - HH:MM` or `<day> HH:MM - HH:MM`
    pub fn extract_formatted(&self, text: &str) -> Vec<String> {
        self.extract(text).iter().map(ToString::to_string).collect()
    }
}

fn to_entry(caps: &Captures<'_>) -> Option<OperatingHoursEntry> {
    let shape = HoursShape::of(caps);
    let start_period = caps.name("sp").map(|m| m.as_str());
    // An unmarked end time reads in the start time's half of the day
    let end_period = caps.name("ep").map(|m| m.as_str()).or(start_period);

    let start = clock(&caps["sh"], &caps["sm"], start_period)?;
    let end = clock(&caps["eh"], &caps["em"], end_period)?;

    let day = match shape {
        HoursShape::DayQualified => caps.name("day").map(|m| m.as_str().to_string()),
        HoursShape::Plain | HoursShape::Meridiem => None,
    };

    Some(OperatingHoursEntry {
        day,
        start_time: start,
        end_time: end,
    })
}

/// Normalize to 24-hour `HH:MM`, rejecting impossible clock values
fn clock(hour: &str, minute: &str, period: Option<&str>) -> Option<String> {
    let mut hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;

    match period {
        Some("오후") if hour < 12 => hour += 12,
        Some("오전") if hour == 12 => hour = 0,
        _ => {}
    }

    if minute >= 60 || hour > 24 || (hour == 24 && minute > 0) {
        return None;
    }

    Some(format!("{hour:02}:{minute:02}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_qualified_range() {
        let hours = OperatingHoursExtractor::new();
        assert_eq!(
            hours.extract_formatted("매일 09:00 - 18:00"),
            vec!["매일 09:00 - 18:00"]
        );
    }

    #[test]
    fn test_plain_ranges_are_padded() {
        let hours = OperatingHoursExtractor::new();
        assert_eq!(hours.extract_formatted("9:00-18:30"), vec!["09:00 - 18:30"]);
        assert_eq!(hours.extract_formatted("10:00~22:00"), vec!["10:00 - 22:00"]);
        assert_eq!(hours.extract_formatted("10:00 22:00"), vec!["10:00 - 22:00"]);
    }

    #[test]
    fn test_meridiem_converted() {
        let hours = OperatingHoursExtractor::new();
        assert_eq!(
            hours.extract_formatted("오전 11:30 - 오후 9:00"),
            vec!["11:30 - 21:00"]
        );
        assert_eq!(hours.extract_formatted("오후 1:00 - 9:00"), vec!["13:00 - 21:00"]);
        assert_eq!(hours.extract_formatted("오전 12:00 - 오전 6:00"), vec!["00:00 - 06:00"]);
    }

    #[test]
    fn test_multiple_matches_in_order() {
        let hours = OperatingHoursExtractor::new();
        let text = "평일 10:00 - 21:00\n토요일 11:00 - 20:00\n평일 10:00 - 21:00";

        let entries = hours.extract(text);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].day.as_deref(), Some("평일"));
        assert_eq!(entries[1].to_string(), "토요일 11:00 - 20:00");
        assert_eq!(entries[0], entries[2]);
    }

    #[test]
    fn test_does_not_span_lines() {
        let hours = OperatingHoursExtractor::new();
        assert!(hours.extract("오픈 10:00\n마감 22:00").is_empty());
    }

    #[test]
    fn test_invalid_clock_skipped() {
        let hours = OperatingHoursExtractor::new();
        assert!(hours.extract("12:75 - 13:00").is_empty());
        assert!(hours.extract("25:00 - 26:00").is_empty());
        assert_eq!(hours.extract_formatted("00:00 - 24:00"), vec!["00:00 - 24:00"]);
    }

    #[test]
    fn test_no_hours() {
        let hours = OperatingHoursExtractor::new();
        assert!(hours.extract("").is_empty());
        assert!(hours.extract("2024-05-01 - 2024-05-10").is_empty());
    }
}
