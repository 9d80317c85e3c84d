//! Suffix-stripping stemmer for English keyword matching.
//!
//! Not a linguistic stemmer: it only has to map a word and its common
//! inflections onto the same key, so persona terms and section tokens
//! meet in the same space.

/// (suffix, replacement) pairs, longer suffixes first within each family.
const SUFFIX_RULES: &[(&str, &str)] = &[
    // -ing
    ("pping", "p"),
    ("tting", "t"),
    ("nning", "n"),
    ("mming", "m"),
    ("dding", "d"),
    ("gging", "g"),
    ("ying", "y"),
    ("eing", "e"),
    ("uing", "ue"),
    ("ing", ""),
    // -ed
    ("pped", "p"),
    ("tted", "t"),
    ("nned", "n"),
    ("mmed", "m"),
    ("dded", "d"),
    ("gged", "g"),
    ("ied", "y"),
    ("eed", "ee"),
    ("ued", "ue"),
    ("ved", "ve"),
    ("ed", ""),
    // plurals
    ("ies", "y"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("xes", "x"),
    ("zes", "z"),
    ("sses", "ss"),
    ("oes", "o"),
    ("ss", "ss"),
    ("us", "us"),
    ("is", "is"),
    ("s", ""),
    // agent nouns
    ("ier", "y"),
    ("er", ""),
    // derivational
    ("ation", ""),
    ("ition", ""),
    ("ution", ""),
    ("tion", ""),
    ("sion", ""),
    ("ment", ""),
    ("iness", "y"),
    ("ness", ""),
    ("ily", "y"),
    ("ally", "al"),
    ("ly", ""),
    ("ful", ""),
    ("able", ""),
    ("ible", ""),
    ("ity", ""),
    ("ive", ""),
    ("ous", ""),
    ("ical", "ic"),
    ("al", ""),
];

/// Passes are repeated until the word stops changing, so `papers` and
/// `paper` land on the same stem.
const MAX_PASSES: usize = 4;

/// Stem a lowercase word. Words of three characters or fewer are kept.
pub fn stem(word: &str) -> String {
    let mut current = word.to_string();
    for _ in 0..MAX_PASSES {
        match strip_once(&current) {
            Some(next) if next != current => current = next,
            _ => break,
        }
    }
    current
}

fn strip_once(word: &str) -> Option<String> {
    if word.len() <= 3 || !word.is_ascii() {
        return None;
    }
    SUFFIX_RULES
        .iter()
        .find(|(suffix, _)| word.len() > suffix.len() + 1 && word.ends_with(suffix))
        .map(|(suffix, replacement)| {
            let root = &word[..word.len() - suffix.len()];
            format!("{}{}", root, replacement)
        })
}
