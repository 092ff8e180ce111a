//! Category-specific response assembly
//!
//! Titles for events and notes come from the keyword collaborator, note
//! summaries from the summarization collaborator. Collaborator failures are
//! logged and degrade to simpler output; they never fail the request.

use std::sync::Arc;

use sw_core::{
    Category, CategoryResult, EventResponse, KeywordExtractor, NoteResponse, PhotoRef,
    PlaceResponse, Summarizer,
};

use crate::classify::Extraction;
use crate::hashtag::HashtagChooser;
use crate::keywords::{strip_digits, top_keywords};

/// Builds the external-facing record for a classified extraction
#[derive(Clone)]
pub struct ResponseBuilder {
    keywords: Arc<dyn KeywordExtractor>,
    summarizer: Arc<dyn Summarizer>,
    chooser: HashtagChooser,
    keyword_count: usize,
    min_sentences: usize,
    no_hashtag_summary: String,
}

impl ResponseBuilder {
    pub fn new(keywords: Arc<dyn KeywordExtractor>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            keywords,
            summarizer,
            chooser: HashtagChooser::default(),
            keyword_count: 3,
            min_sentences: 3,
            no_hashtag_summary: "해쉬태그 없더".to_string(),
        }
    }

    pub fn with_chooser(mut self, chooser: HashtagChooser) -> Self {
        self.chooser = chooser;
        self
    }

    pub fn with_keyword_count(mut self, count: usize) -> Self {
        self.keyword_count = count;
        self
    }

    pub fn with_min_sentences(mut self, min: usize) -> Self {
        self.min_sentences = min;
        self
    }

    pub fn with_no_hashtag_summary(mut self, summary: impl Into<String>) -> Self {
        self.no_hashtag_summary = summary.into();
        self
    }

    pub fn build(
        &self,
        category: Category,
        extraction: &Extraction,
        photo: &PhotoRef,
    ) -> CategoryResult {
        match category {
            Category::Place => CategoryResult::Place(self.place(extraction, photo)),
            Category::Event => CategoryResult::Event(self.event(extraction, photo)),
            Category::Note => CategoryResult::Note(self.note(extraction, photo)),
        }
    }

    fn place(&self, extraction: &Extraction, photo: &PhotoRef) -> PlaceResponse {
        let summary = self
            .chooser
            .choose(&extraction.hashtags)
            .map(str::to_string)
            .unwrap_or_else(|| self.no_hashtag_summary.clone());

        PlaceResponse {
            category_id: Category::Place.id(),
            title: extraction.lines.first().cloned().unwrap_or_default(),
            address: extraction.places.join(" "),
            operating_hours: extraction.hours.iter().map(ToString::to_string).collect(),
            summary,
            photo_name: photo.name.clone(),
            photo_url: photo.url.clone(),
        }
    }

    fn event(&self, extraction: &Extraction, photo: &PhotoRef) -> EventResponse {
        EventResponse {
            category_id: Category::Event.id(),
            title: self.top_keywords(&extraction.lines).join(" "),
            list: extraction.events.clone(),
            photo_name: photo.name.clone(),
            photo_url: photo.url.clone(),
        }
    }

    fn note(&self, extraction: &Extraction, photo: &PhotoRef) -> NoteResponse {
        let top = self.top_keywords(&extraction.lines);

        NoteResponse {
            category_id: Category::Note.id(),
            title: top.join(" "),
            summary: self.note_summary(&extraction.lines, &top).join("\n"),
            photo_name: photo.name.clone(),
            photo_url: photo.url.clone(),
        }
    }

    /// Top keywords over digit-stripped lines; empty when ranking fails
    fn top_keywords(&self, lines: &[String]) -> Vec<String> {
        let stripped: Vec<String> = lines.iter().map(|line| strip_digits(line)).collect();

        match self.keywords.extract_keywords(&stripped) {
            Ok(scores) => top_keywords(&scores, self.keyword_count),
            Err(e) => {
                tracing::warn!(extractor = self.keywords.name(), error = %e, "keyword ranking failed");
                Vec::new()
            }
        }
    }

    /// Key sentences sharing a top keyword, then any line with a top
    /// keyword, then every line.
    fn note_summary(&self, lines: &[String], top: &[String]) -> Vec<String> {
        let mentions_top = |sentence: &str| top.iter().any(|word| sentence.contains(word.as_str()));

        match self.summarizer.summarize(lines, self.min_sentences) {
            Ok(summary) => {
                let overlapping: Vec<String> = summary
                    .sentences
                    .into_iter()
                    .filter(|sentence| mentions_top(sentence.as_str()))
                    .collect();
                if !overlapping.is_empty() {
                    return overlapping;
                }
                tracing::debug!("no key sentence shares a top keyword");
            }
            Err(e) => {
                tracing::debug!(summarizer = self.summarizer.name(), error = %e, "summarizer fell back");
            }
        }

        let with_keyword: Vec<String> = lines
            .iter()
            .filter(|line| mentions_top(line.as_str()))
            .cloned()
            .collect();
        if with_keyword.is_empty() {
            lines.to_vec()
        } else {
            with_keyword
        }
    }
}

impl std::fmt::Debug for ResponseBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseBuilder")
            .field("keywords", &self.keywords.name())
            .field("summarizer", &self.summarizer.name())
            .field("chooser", &self.chooser)
            .field("keyword_count", &self.keyword_count)
            .finish()
    }
}
