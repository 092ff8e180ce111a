//! End-to-end text analysis
//!
//! fragments → lines → hashtag split → field extractors → classifier →
//! response builder. Holds no mutable state, so one instance is shared by
//! every request.

use std::sync::Arc;

use sw_core::{
    CategoryResult, KeywordExtractor, PhotoRef, PipelineConfig, RecognizedFragment, Summarizer,
};

use crate::address::AddressExtractor;
use crate::classify::{Classifier, Extraction};
use crate::event::EventExtractor;
use crate::hashtag::{HashtagChooser, HashtagSplitter};
use crate::hours::OperatingHoursExtractor;
use crate::keywords::{KeySentenceSummarizer, WordRankExtractor};
use crate::lines::LineGrouper;
use crate::response::ResponseBuilder;

/// Screenshot text analysis pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    grouper: LineGrouper,
    splitter: HashtagSplitter,
    events: EventExtractor,
    addresses: AddressExtractor,
    hours: OperatingHoursExtractor,
    classifier: Classifier,
    builder: ResponseBuilder,
}

impl Pipeline {
    /// Build from configuration with the given collaborators
    pub fn from_config(
        config: &PipelineConfig,
        keywords: Arc<dyn KeywordExtractor>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        let builder = ResponseBuilder::new(keywords, summarizer)
            .with_chooser(HashtagChooser::from_seed(config.hashtag_seed))
            .with_keyword_count(config.keyword_count)
            .with_min_sentences(config.summary_min_sentences)
            .with_no_hashtag_summary(config.no_hashtag_summary.clone());

        Self {
            grouper: LineGrouper::new(config.line_tolerance).with_anchor(config.line_anchor),
            splitter: HashtagSplitter::new(),
            events: EventExtractor::new(),
            addresses: AddressExtractor::new(),
            hours: OperatingHoursExtractor::new(),
            classifier: Classifier::new(config.precedence.clone()),
            builder,
        }
    }

    /// Build from configuration with the built-in keyword ranker and summarizer
    pub fn with_defaults(config: &PipelineConfig) -> Self {
        Self::from_config(
            config,
            Arc::new(WordRankExtractor::new()),
            Arc::new(KeySentenceSummarizer::default()),
        )
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Run every field extractor over a newline-separated text block
    pub fn extract(&self, text: &str) -> Extraction {
        let split = self.splitter.split(text);
        // Blank lines left behind by removed hashtags carry no content
        let lines: Vec<&str> = split
            .body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let events = self.events.extract_lines(&lines);
        let places = self.addresses.extract_lines(lines.iter().copied());
        let hours = self.hours.extract(&split.body);

        Extraction {
            lines: lines.iter().map(|line| line.to_string()).collect(),
            hashtags: split.hashtags,
            events,
            places,
            hours,
        }
    }

    /// Classify a text block and build its category result
    pub fn analyze_text(&self, text: &str, photo: &PhotoRef) -> CategoryResult {
        let extraction = self.extract(text);
        let category = self.classifier.classify(&extraction);

        tracing::debug!(
            photo = %photo.name,
            lines = extraction.lines.len(),
            events = extraction.events.len(),
            places = extraction.places.len(),
            hours = extraction.hours.len(),
            category = %category,
            "Classified text block"
        );

        self.builder.build(category, &extraction, photo)
    }

    /// Group OCR fragments into lines, then analyze the text
    pub fn analyze_fragments(
        &self,
        fragments: &[RecognizedFragment],
        photo: &PhotoRef,
    ) -> CategoryResult {
        let text = self.grouper.format(fragments);
        self.analyze_text(&text, photo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sw_core::Category;

    fn pipeline() -> Pipeline {
        let config = PipelineConfig {
            hashtag_seed: Some(1),
            ..Default::default()
        };
        Pipeline::with_defaults(&config)
    }

    fn photo() -> PhotoRef {
        PhotoRef::from_url("https://cdn.example.com/shots/shot.jpg")
    }

    #[test]
    fn test_extract_runs_every_extractor() {
        let text = "전시명\n2024-05-01 - 2024-05-10\n주소: 서울 강남구 123\n매일 09:00 - 18:00 #전시";
        let extraction = pipeline().extract(text);

        assert_eq!(extraction.hashtags, vec!["#전시"]);
        assert_eq!(extraction.events.len(), 1);
        assert_eq!(extraction.places, vec!["서울 강남구 123"]);
        assert_eq!(extraction.hours.len(), 1);
        assert_eq!(extraction.lines.len(), 4);
    }

    #[test]
    fn test_hashtag_only_lines_are_dropped() {
        let text = "카페 온더플랜\n#성수 #카페\n서울 성동구  연무장길 41 #브런치";
        let extraction = pipeline().extract(text);

        assert_eq!(
            extraction.lines,
            vec!["카페 온더플랜", "서울 성동구  연무장길 41"]
        );
        assert_eq!(extraction.hashtags, vec!["#성수", "#카페", "#브런치"]);
    }

    #[test]
    fn test_address_and_date_is_an_event() {
        let text = "전시명\n2024-05-01 - 2024-05-10\n주소: 서울 강남구 123";
        let result = pipeline().analyze_text(text, &photo());

        assert_eq!(result.category(), Category::Event);
        let CategoryResult::Event(event) = result else {
            panic!("expected event");
        };
        assert_eq!(event.list[0].date, "2024-05-01 - 2024-05-10");
        assert_eq!(event.photo_name, "shot.jpg");
    }

    #[test]
    fn test_place_first_precedence_from_config() {
        let config = PipelineConfig {
            precedence: vec![Category::Place, Category::Event],
            ..Default::default()
        };
        let text = "전시명\n2024-05-01 - 2024-05-10\n주소: 서울 강남구 123";
        let result = Pipeline::with_defaults(&config).analyze_text(text, &photo());

        assert_eq!(result.category(), Category::Place);
    }

    #[test]
    fn test_place_summary_from_hashtag() {
        let text = "카페 온더플랜\n서울 성동구 연무장길 41\n#성수카페";
        let result = pipeline().analyze_text(text, &photo());

        let CategoryResult::Place(place) = result else {
            panic!("expected place");
        };
        assert_eq!(place.title, "카페 온더플랜");
        assert_eq!(place.summary, "#성수카페");
        assert!(place.address.starts_with("서울 성동구"));
    }

    #[test]
    fn test_plain_text_is_a_note() {
        let result = pipeline().analyze_text("장보기 목록\n우유 두 개\n계란 한 판", &photo());
        assert_eq!(result.category(), Category::Note);
    }

    #[test]
    fn test_empty_text_is_a_note() {
        let result = pipeline().analyze_fragments(&[], &photo());

        let CategoryResult::Note(note) = result else {
            panic!("expected note");
        };
        assert_eq!(note.title, "");
        assert_eq!(note.summary, "");
    }

    #[test]
    fn test_fragments_grouped_before_analysis() {
        let fragments = vec![
            RecognizedFragment::new("전시명", 10.0),
            RecognizedFragment::new("2024-05-01", 40.0),
            RecognizedFragment::new("-", 41.0),
            RecognizedFragment::new("2024-05-10", 42.0),
        ];
        let result = pipeline().analyze_fragments(&fragments, &photo());

        let CategoryResult::Event(event) = result else {
            panic!("expected event");
        };
        assert_eq!(event.list.len(), 1);
        assert_eq!(event.list[0].name, "전시명");
    }

    proptest! {
        #[test]
        fn prop_analyze_text_never_panics(
            text in "[가나다서울시구로길전시회오전후매일 0-9#:~./\\-\n년월일]{0,120}",
        ) {
            let result = pipeline().analyze_text(&text, &photo());

            if let CategoryResult::Event(event) = &result {
                prop_assert!(!event.list.is_empty());
            }
            if let CategoryResult::Place(place) = &result {
                prop_assert!(!place.address.is_empty());
            }
        }

        #[test]
        fn prop_analyze_fragments_never_panics(
            fragments in proptest::collection::vec(
                ("[가나다0-9#:~\\- ]{0,12}", -50.0f32..500.0),
                0..20,
            ),
        ) {
            let fragments: Vec<RecognizedFragment> = fragments
                .into_iter()
                .map(|(text, y)| RecognizedFragment::new(text, y))
                .collect();

            let result = pipeline().analyze_fragments(&fragments, &photo());
            prop_assert!(result.category().id() >= 1);
        }
    }
}
