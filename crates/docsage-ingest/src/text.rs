//! Text normalization shared by the keyword model, the scorer and the
//! summarizer: tokenization, stopwords, stemming and sentence splitting.

pub mod stemmer;

use once_cell::sync::Lazy;
use std::collections::HashSet;

pub use stemmer::stem;

/// English stopwords (NLTK list, trimmed to the words that survive the
/// length filter).
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "about", "above", "after", "again", "against", "all", "and", "any", "are", "aren",
        "because", "been", "before", "being", "below", "between", "both", "but", "can",
        "couldn", "did", "didn", "does", "doesn", "doing", "don", "down", "during", "each",
        "few", "for", "from", "further", "had", "hadn", "has", "hasn", "have", "haven",
        "having", "her", "here", "hers", "herself", "him", "himself", "his", "how", "into",
        "isn", "its", "itself", "just", "mightn", "more", "most", "mustn", "myself", "needn",
        "nor", "not", "now", "off", "once", "only", "other", "our", "ours", "ourselves",
        "out", "over", "own", "same", "shan", "she", "should", "shouldn", "some", "such",
        "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
        "these", "they", "this", "those", "through", "too", "under", "until", "very", "was",
        "wasn", "were", "weren", "what", "when", "where", "which", "while", "who", "whom",
        "why", "will", "with", "won", "wouldn", "you", "your", "yours", "yourself",
        "yourselves",
    ]
    .into_iter()
    .collect()
});

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Lowercase and replace everything that is not alphanumeric with a space.
pub fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
}

/// Normalize, drop stopwords and tokens of two characters or fewer, stem.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .filter(|t| t.chars().count() > 2 && !is_stopword(t))
        .map(stem)
        .collect()
}

/// Split text into sentences on `.`, `!` or `?` followed by whitespace.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if matches!(b, b'.' | b'!' | b'?')
            && i + 1 < bytes.len()
            && bytes[i + 1].is_ascii_whitespace()
        {
            let s = text[start..=i].trim();
            if !s.is_empty() {
                sentences.push(s);
            }
            start = i + 1;
        }
    }
    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}

/// Truncate to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
