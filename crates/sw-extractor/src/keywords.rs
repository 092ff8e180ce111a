//! Default keyword ranking and key-sentence summarization
//!
//! Both are collaborators behind the `KeywordExtractor` and `Summarizer`
//! traits; the response builder never depends on these concrete types.
//!
//! The ranker builds a word co-occurrence graph over adjacent tokens and runs
//! a damped iterative ranking biased towards frequent words.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use sw_core::{KeywordExtractor, KeywordScores, Result, Summarizer, Summary, SwError};

static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

/// Remove every digit run, as the keyword collaborator expects
pub fn strip_digits(line: &str) -> String {
    DIGITS_RE.replace_all(line, "").into_owned()
}

/// Top `n` keywords by descending score; ties keep first-occurrence order
pub fn top_keywords(scores: &KeywordScores, n: usize) -> Vec<String> {
    let mut ranked: Vec<&(String, f64)> = scores.iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked
        .into_iter()
        .take(n)
        .map(|(word, _)| word.clone())
        .collect()
}

/// Ranking parameters
#[derive(Debug, Clone)]
pub struct WordRankConfig {
    /// Minimum occurrences for a token to be ranked
    pub min_count: usize,
    /// Maximum token length in characters
    pub max_length: usize,
    /// Damping factor
    pub beta: f64,
    /// Ranking iterations
    pub max_iter: usize,
}

impl Default for WordRankConfig {
    fn default() -> Self {
        Self {
            min_count: 1,
            max_length: 20,
            beta: 0.95,
            max_iter: 10,
        }
    }
}

/// Graph-based keyword ranker
#[derive(Debug, Clone, Default)]
pub struct WordRankExtractor {
    config: WordRankConfig,
}

impl WordRankExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WordRankConfig) -> Self {
        Self { config }
    }

    fn tokenize(&self, line: &str) -> Vec<String> {
        line.split_whitespace()
            .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|token| {
                let len = token.chars().count();
                len >= 2 && len <= self.config.max_length
            })
            .map(str::to_string)
            .collect()
    }

    fn rank(&self, lines: &[String]) -> KeywordScores {
        let tokenized: Vec<Vec<String>> = lines.iter().map(|line| self.tokenize(line)).collect();

        // Vocabulary in first-occurrence order
        let mut vocab: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<usize> = Vec::new();
        for token in tokenized.iter().flatten() {
            match index.get(token) {
                Some(&i) => counts[i] += 1,
                None => {
                    index.insert(token.clone(), vocab.len());
                    vocab.push(token.clone());
                    counts.push(1);
                }
            }
        }

        let keep: Vec<bool> = counts.iter().map(|&c| c >= self.config.min_count).collect();
        let n = vocab.len();
        if n == 0 {
            return Vec::new();
        }

        let mut edges: Vec<HashMap<usize, f64>> = vec![HashMap::new(); n];
        for tokens in &tokenized {
            for pair in tokens.windows(2) {
                let (a, b) = (index[&pair[0]], index[&pair[1]]);
                if a == b || !keep[a] || !keep[b] {
                    continue;
                }
                *edges[a].entry(b).or_insert(0.0) += 1.0;
                *edges[b].entry(a).or_insert(0.0) += 1.0;
            }
        }

        let kept_total: usize = counts
            .iter()
            .zip(&keep)
            .filter(|(_, &k)| k)
            .map(|(&c, _)| c)
            .sum();
        let kept_nodes = keep.iter().filter(|&&k| k).count().max(1);
        let bias: Vec<f64> = counts
            .iter()
            .map(|&c| c as f64 * kept_nodes as f64 / kept_total.max(1) as f64)
            .collect();
        let out_weight: Vec<f64> = edges.iter().map(|e| e.values().sum()).collect();

        let beta = self.config.beta;
        let mut rank = bias.clone();
        for _ in 0..self.config.max_iter {
            let mut next: Vec<f64> = bias.iter().map(|b| (1.0 - beta) * b).collect();
            for (u, neighbours) in edges.iter().enumerate() {
                if out_weight[u] == 0.0 {
                    // Dangling words keep their own mass
                    next[u] += beta * rank[u];
                    continue;
                }
                for (&v, &w) in neighbours {
                    next[v] += beta * rank[u] * w / out_weight[u];
                }
            }
            rank = next;
        }

        vocab
            .into_iter()
            .zip(rank)
            .zip(keep)
            .filter(|(_, k)| *k)
            .map(|(scored, _)| scored)
            .collect()
    }
}

impl KeywordExtractor for WordRankExtractor {
    fn extract_keywords(&self, lines: &[String]) -> Result<KeywordScores> {
        Ok(self.rank(lines))
    }

    fn name(&self) -> &str {
        "wordrank"
    }
}

/// Extractive summarizer picking the lines richest in ranked keywords
#[derive(Debug, Clone)]
pub struct KeySentenceSummarizer {
    ranker: WordRankExtractor,
    max_sentences: usize,
}

impl KeySentenceSummarizer {
    pub fn new(max_sentences: usize) -> Self {
        Self {
            ranker: WordRankExtractor::new(),
            max_sentences,
        }
    }
}

impl Default for KeySentenceSummarizer {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Summarizer for KeySentenceSummarizer {
    fn summarize(&self, lines: &[String], min_sentences: usize) -> Result<Summary> {
        let sentences: Vec<&String> = lines.iter().filter(|l| !l.trim().is_empty()).collect();
        if sentences.len() < min_sentences {
            return Err(SwError::SummarizationError(format!(
                "insufficient sentences: {} < {min_sentences}",
                sentences.len()
            )));
        }

        let stripped: Vec<String> = sentences.iter().map(|s| strip_digits(s)).collect();
        let keywords = self.ranker.rank(&stripped);
        let score_of: HashMap<&str, f64> =
            keywords.iter().map(|(w, s)| (w.as_str(), *s)).collect();

        let mut scored: Vec<(usize, f64)> = stripped
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let score = self
                    .ranker
                    .tokenize(line)
                    .iter()
                    .filter_map(|t| score_of.get(t.as_str()))
                    .sum();
                (i, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut picked: Vec<usize> = scored
            .into_iter()
            .filter(|(_, score)| *score > 0.0)
            .take(self.max_sentences)
            .map(|(i, _)| i)
            .collect();
        picked.sort_unstable();

        Ok(Summary {
            keywords,
            sentences: picked.into_iter().map(|i| sentences[i].trim().to_string()).collect(),
        })
    }

    fn name(&self) -> &str {
        "key-sentence"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_strip_digits() {
        assert_eq!(strip_digits("20240425 -20240721 전시"), " - 전시");
        assert_eq!(strip_digits("1<미래긍정"), "<미래긍정");
    }

    #[test]
    fn test_top_keywords_stable_ties() {
        let scores = vec![
            ("전시".to_string(), 1.0),
            ("서울".to_string(), 2.0),
            ("미술관".to_string(), 1.0),
            ("건축".to_string(), 1.0),
        ];
        assert_eq!(top_keywords(&scores, 3), vec!["서울", "전시", "미술관"]);
        assert!(top_keywords(&Vec::new(), 3).is_empty());
    }

    #[test]
    fn test_frequent_connected_word_ranks_first() {
        let text = "서울 전시 소개\n서울 미술관 전시\n전시 일정 안내\n전시 관람 정보";
        let scores = WordRankExtractor::new().extract_keywords(&lines(text)).unwrap();

        assert_eq!(scores[0].0, "서울");
        assert_eq!(top_keywords(&scores, 1), vec!["전시"]);
    }

    #[test]
    fn test_short_and_punctuation_tokens_dropped() {
        let scores = WordRankExtractor::new()
            .extract_keywords(&lines("a / - 전 [전시]"))
            .unwrap();
        let words: Vec<&str> = scores.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["전시"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(WordRankExtractor::new().extract_keywords(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_summarizer_requires_minimum_sentences() {
        let summarizer = KeySentenceSummarizer::default();
        let result = summarizer.summarize(&lines("한 줄\n두 줄"), 3);
        assert!(matches!(result, Err(SwError::SummarizationError(_))));
    }

    #[test]
    fn test_summarizer_keeps_source_order() {
        let text = "회의 메모\n다음 주 회의 안건 정리\n점심 메뉴\n회의 자료 공유 회의 일정\n기타";
        let summary = KeySentenceSummarizer::new(2).summarize(&lines(text), 3).unwrap();

        assert_eq!(summary.sentences.len(), 2);
        assert!(summary.sentences.iter().all(|s| s.contains("회의")));
        let first = text.find(&summary.sentences[0]).unwrap();
        let second = text.find(&summary.sentences[1]).unwrap();
        assert!(first < second);
        assert!(!summary.keywords.is_empty());
    }
}
