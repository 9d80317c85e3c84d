//! Refined extracts for top-ranked sections.
//!
//! Short bodies pass through untouched. Longer ones are cut down to a few
//! sentences, either the leading ones or the most salient ones, and then
//! trimmed at a word boundary.

use once_cell::sync::Lazy;
use regex::Regex;

use docsage_core::config::{SummaryConfig, SummaryStrategy};
use docsage_core::Section;

use crate::text::{split_sentences, truncate_chars};

const ELLIPSIS: &str = "...";

const INDICATOR_WORDS: &[&str] = &[
    "important", "key", "main", "conclusion", "summary", "result", "finding", "therefore",
    "thus", "shows", "demonstrates", "reveals", "significant", "notably",
];

static CAMEL_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-z]+[A-Z][a-zA-Z]*\b").expect("camel case regex"));
static SNAKE_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-z]+_[a-z]+\b").expect("snake case regex"));

#[derive(Debug, Clone, Default)]
pub struct Summarizer {
    config: SummaryConfig,
}

impl Summarizer {
    pub fn new(config: SummaryConfig) -> Self {
        Self { config }
    }

    /// Refined text for a section. Sections without body text fall back to
    /// their heading.
    pub fn summarize(&self, section: &Section) -> String {
        let body = section.body_text.trim();
        let text = if body.is_empty() {
            section.heading.text.trim()
        } else {
            body
        };

        let sentences = split_sentences(text);
        if sentences.len() <= self.config.max_sentences
            && text.chars().count() <= self.config.max_chars
        {
            return text.to_string();
        }

        let picked = match self.config.strategy {
            SummaryStrategy::Leading => sentences
                .iter()
                .take(self.config.max_sentences.max(1))
                .copied()
                .collect::<Vec<_>>(),
            SummaryStrategy::Salient => salient_sentences(&sentences, self.config.max_sentences.max(1)),
        };

        truncate_words(&picked.join(" "), self.config.max_chars)
    }
}

/// Best `n` sentences by heuristic score, returned in document order.
fn salient_sentences<'a>(sentences: &[&'a str], n: usize) -> Vec<&'a str> {
    let total = sentences.len();
    let mut scored: Vec<(i32, usize)> = sentences
        .iter()
        .enumerate()
        .map(|(i, sent)| (sentence_score(sent, i, total), i))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let mut keep: Vec<usize> = scored.into_iter().take(n).map(|(_, i)| i).collect();
    keep.sort_unstable();
    keep.into_iter().map(|i| sentences[i]).collect()
}

fn sentence_score(sentence: &str, index: usize, total: usize) -> i32 {
    let mut score = 0i32;

    // Openings and closings carry the point of a passage.
    if index < 3 {
        score += (3 - index) as i32;
    }
    if total > 5 && index >= total.saturating_sub(2) {
        score += 2;
    }

    let len = sentence.len();
    if len > 50 && len < 200 {
        score += 2;
    } else if len >= 200 {
        score += 1;
    }

    let lower = sentence.to_lowercase();
    let indicators = INDICATOR_WORDS.iter().filter(|w| lower.contains(**w)).count();
    score += (indicators * 2) as i32;

    let capitalized = sentence
        .split_whitespace()
        .skip(1)
        .filter(|w| {
            w.chars().next().is_some_and(char::is_uppercase) && !w.chars().all(char::is_uppercase)
        })
        .count();
    score += capitalized.min(3) as i32;

    if CAMEL_CASE.is_match(sentence) {
        score += 1;
    }
    if SNAKE_CASE.is_match(sentence) {
        score += 1;
    }

    score
}

/// Cut to at most `max_chars` characters including the ellipsis, backing
/// off to the last word boundary.
pub fn truncate_words(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let budget = max_chars.saturating_sub(ELLIPSIS.len());
    let mut head = truncate_chars(text, budget);
    let cut_mid_word = text[head.len()..]
        .chars()
        .next()
        .is_some_and(|c| !c.is_whitespace());
    if cut_mid_word {
        if let Some(idx) = head.rfind(char::is_whitespace) {
            head = &head[..idx];
        }
    }
    format!("{}{}", head.trim_end(), ELLIPSIS)
}
