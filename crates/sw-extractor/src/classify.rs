//! Category classification
//!
//! A strict priority cascade: categories are checked in a fixed order and
//! the first one whose extractor produced output wins. Text with no
//! structured match is a note.

use sw_core::{Category, EventRecord, OperatingHoursEntry};

/// Everything the field extractors found in one text block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Logical lines of the cleaned body
    pub lines: Vec<String>,
    /// Hashtags removed from the body, first-seen order
    pub hashtags: Vec<String>,
    /// One record per date pair
    pub events: Vec<EventRecord>,
    /// At most one address per line
    pub places: Vec<String>,
    /// Time ranges in appearance order
    pub hours: Vec<OperatingHoursEntry>,
}

impl Extraction {
    /// Whether the extractor backing `category` found anything
    pub fn has(&self, category: Category) -> bool {
        match category {
            Category::Event => !self.events.is_empty(),
            Category::Place => !self.places.is_empty(),
            Category::Note => true,
        }
    }
}

/// Priority-ordered category decision
#[derive(Debug, Clone)]
pub struct Classifier {
    precedence: Vec<Category>,
}

impl Classifier {
    /// Create a classifier checking categories in `precedence` order
    pub fn new(precedence: Vec<Category>) -> Self {
        Self { precedence }
    }

    pub fn precedence(&self) -> &[Category] {
        &self.precedence
    }

    pub fn classify(&self, extraction: &Extraction) -> Category {
        self.precedence
            .iter()
            .copied()
            .find(|category| extraction.has(*category))
            .unwrap_or(Category::Note)
    }
}

impl Default for Classifier {
    /// Events before places
    fn default() -> Self {
        Self::new(vec![Category::Event, Category::Place])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extraction(events: bool, places: bool) -> Extraction {
        Extraction {
            events: if events {
                vec![EventRecord::new("전시", "2024-05-01", "2024-05-10")]
            } else {
                vec![]
            },
            places: if places {
                vec!["서울 강남구 123".to_string()]
            } else {
                vec![]
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_event_beats_place() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(&extraction(true, true)), Category::Event);
        assert_eq!(classifier.classify(&extraction(true, false)), Category::Event);
        assert_eq!(classifier.classify(&extraction(false, true)), Category::Place);
        assert_eq!(classifier.classify(&extraction(false, false)), Category::Note);
    }

    #[test]
    fn test_place_first_precedence() {
        let classifier = Classifier::new(vec![Category::Place, Category::Event]);
        assert_eq!(classifier.classify(&extraction(true, true)), Category::Place);
        assert_eq!(classifier.classify(&extraction(true, false)), Category::Event);
    }

    #[test]
    fn test_hours_alone_is_a_note() {
        let only_hours = Extraction {
            hours: vec![OperatingHoursEntry {
                day: None,
                start_time: "09:00".to_string(),
                end_time: "18:00".to_string(),
            }],
            ..Default::default()
        };
        assert_eq!(Classifier::default().classify(&only_hours), Category::Note);
    }

    #[test]
    fn test_empty_precedence_falls_back_to_note() {
        let classifier = Classifier::new(vec![]);
        assert_eq!(classifier.classify(&extraction(true, true)), Category::Note);
    }
}
