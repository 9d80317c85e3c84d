//! Heading detection: fragments → heading outline → sections.
//!
//! A fragment is a heading candidate when it is short, does not read like
//! a sentence, and one of the configured rules fires. Heading levels come
//! from the relative size of the heading fonts, or from the numbering when
//! every heading uses the same size.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use docsage_core::config::{HeadingConfig, PreamblePolicy, Rule};
use docsage_core::{Error, Fragment, Heading, HeadingLevel, Outline, OutlineEntry, Position, Result, Section};

/// `1.`, `2.3`, `4.1.2.` numbering prefixes.
static NUMBERING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)*)\.?\s+").expect("numbering regex"));

/// Wrapped heading lines closer than this many font sizes merge.
pub(crate) const MERGE_GAP_FACTOR: f32 = 1.5;

/// Slack for float comparisons on font sizes.
const SIZE_EPSILON: f32 = 1e-3;

/// A keyword heading may carry a few trailing words ("Results and Discussion").
const MAX_KEYWORD_HEADING_WORDS: usize = 4;

#[derive(Debug)]
enum CompiledRule {
    FontRatio(f32),
    BoldPattern(Vec<Regex>),
    KeywordMatch(Vec<String>),
}

impl CompiledRule {
    fn name(&self) -> &'static str {
        match self {
            Self::FontRatio(_) => "font_ratio",
            Self::BoldPattern(_) => "bold_pattern",
            Self::KeywordMatch(_) => "keyword_match",
        }
    }

    fn matches(&self, fragment: &Fragment, text: &str, body_size: f32) -> bool {
        match self {
            Self::FontRatio(ratio) => fragment.font_size + SIZE_EPSILON >= body_size * ratio,
            Self::BoldPattern(patterns) => {
                fragment.is_bold && patterns.iter().any(|re| re.is_match(text))
            }
            Self::KeywordMatch(keywords) => match keyword_hit(keywords, text) {
                Some(KeywordHit::Exact) => true,
                // A leading keyword at body size needs bold to stand out from prose.
                Some(KeywordHit::Leading) => {
                    fragment.is_bold || fragment.font_size > body_size + SIZE_EPSILON
                }
                None => false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeywordHit {
    Exact,
    Leading,
}

fn keyword_hit(keywords: &[String], text: &str) -> Option<KeywordHit> {
    let stripped = strip_numbering(text).trim_end_matches(':').to_lowercase();
    if keywords.iter().any(|k| stripped == *k) {
        return Some(KeywordHit::Exact);
    }
    let words = stripped.split_whitespace().count();
    keywords
        .iter()
        .any(|k| {
            words <= MAX_KEYWORD_HEADING_WORDS
                && stripped.starts_with(k.as_str())
                && stripped[k.len()..].starts_with(' ')
        })
        .then_some(KeywordHit::Leading)
}

/// One line of the document after classification.
#[derive(Debug)]
enum Line<'a> {
    Heading(PendingHeading),
    Body(&'a Fragment),
}

#[derive(Debug)]
struct PendingHeading {
    text: String,
    page: u32,
    size: f32,
    bold: bool,
    placed: bool,
    y: f32,
    level: HeadingLevel,
}

/// Layout-heuristic heading detector.
#[derive(Debug)]
pub struct HeadingDetector {
    rules: Vec<CompiledRule>,
    max_words: usize,
    max_chars: usize,
    preamble: PreamblePolicy,
}

impl HeadingDetector {
    /// Compile the configured rules. Invalid regexes are a configuration error.
    pub fn new(config: &HeadingConfig) -> Result<Self> {
        let mut ordered: Vec<&Rule> = config.rules.iter().collect();
        ordered.sort_by_key(|r| r.priority());

        let mut rules = Vec::with_capacity(ordered.len());
        for rule in ordered {
            rules.push(match rule {
                Rule::FontRatio { min_ratio } => CompiledRule::FontRatio(*min_ratio),
                Rule::BoldPattern { patterns } => CompiledRule::BoldPattern(
                    patterns
                        .iter()
                        .map(|p| {
                            Regex::new(p).map_err(|e| {
                                Error::Config(format!("invalid heading pattern {:?}: {}", p, e))
                            })
                        })
                        .collect::<Result<Vec<_>>>()?,
                ),
                Rule::KeywordMatch { keywords } => CompiledRule::KeywordMatch(
                    keywords.iter().map(|k| k.trim().to_lowercase()).collect(),
                ),
            });
        }

        Ok(Self {
            rules,
            max_words: config.max_heading_words,
            max_chars: config.max_heading_chars,
            preamble: config.preamble,
        })
    }

    /// Split a document's fragments into sections.
    ///
    /// `fallback_title` names the synthesized section when the document has
    /// no headings (or when the preamble is kept).
    pub fn detect(&self, fragments: &[Fragment], document_id: &str, fallback_title: &str) -> Vec<Section> {
        let lines = self.classify_lines(fragments);
        let Some(first_page) = lines.first().map(|l| match l {
            Line::Heading(h) => h.page,
            Line::Body(f) => f.page,
        }) else {
            return Vec::new();
        };

        let heading_count = lines.iter().filter(|l| matches!(l, Line::Heading(_))).count();
        if heading_count == 0 {
            debug!("{}: no headings, using a single section", document_id);
            let heading = Heading {
                level: HeadingLevel::H1,
                text: fallback_title.to_string(),
                page: first_page,
            };
            return vec![Section::new(document_id, heading, join_body(&lines))];
        }

        let mut sections = Vec::with_capacity(heading_count + 1);

        let preamble_len = lines
            .iter()
            .position(|l| matches!(l, Line::Heading(_)))
            .unwrap_or(lines.len());
        if preamble_len > 0 && self.preamble == PreamblePolicy::Synthesize {
            let heading = Heading {
                level: HeadingLevel::H1,
                text: fallback_title.to_string(),
                page: first_page,
            };
            sections.push(Section::new(document_id, heading, join_body(&lines[..preamble_len])));
        }

        for (idx, line) in lines.iter().enumerate() {
            let Line::Heading(h) = line else { continue };
            let end = lines[idx + 1..]
                .iter()
                .position(|l| matches!(l, Line::Heading(next) if next.level <= h.level))
                .map(|offset| idx + 1 + offset)
                .unwrap_or(lines.len());
            let heading = Heading {
                level: h.level,
                text: h.text.clone(),
                page: h.page,
            };
            sections.push(Section::new(document_id, heading, join_body(&lines[idx + 1..end])));
        }

        debug!("{}: {} sections", document_id, sections.len());
        sections
    }

    /// Headings only, as a title plus outline.
    pub fn outline(&self, fragments: &[Fragment], title: Option<&str>) -> Outline {
        let outline: Vec<OutlineEntry> = self
            .classify_lines(fragments)
            .into_iter()
            .filter_map(|l| match l {
                Line::Heading(h) => Some(OutlineEntry {
                    level: h.level,
                    text: h.text,
                    page: h.page,
                }),
                Line::Body(_) => None,
            })
            .collect();

        let title = title
            .map(str::to_string)
            .or_else(|| {
                outline
                    .iter()
                    .find(|e| e.level == HeadingLevel::H1)
                    .map(|e| e.text.clone())
            })
            .unwrap_or_default();

        Outline { title, outline }
    }

    /// Name of the first rule that classifies `fragment` as a heading.
    pub fn classify(&self, fragment: &Fragment, body_size: f32) -> Option<&'static str> {
        let text = fragment.text.trim();
        if text.ends_with('.')
            || text.chars().count() > self.max_chars
            || text.split_whitespace().count() > self.max_words
        {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(fragment, text, body_size))
            .map(CompiledRule::name)
    }

    /// Steps shared by `detect` and `outline`: filter, classify, merge
    /// wrapped lines, assign and clamp levels.
    fn classify_lines<'a>(&self, fragments: &'a [Fragment]) -> Vec<Line<'a>> {
        let usable: Vec<&Fragment> = fragments.iter().filter(|f| f.is_well_formed()).collect();
        if usable.is_empty() {
            return Vec::new();
        }
        let body = body_size(&usable);

        let mut lines: Vec<Line<'a>> = Vec::with_capacity(usable.len());
        for fragment in usable {
            let Some(rule) = self.classify(fragment, body) else {
                lines.push(Line::Body(fragment));
                continue;
            };
            debug!("heading {:?} on page {} via {}", fragment.text, fragment.page, rule);

            let text = fragment.text.trim();
            let placed = fragment.position != Position::default();
            if let Some(Line::Heading(prev)) = lines.last_mut() {
                let continues = prev.placed
                    && placed
                    && prev.page == fragment.page
                    && prev.bold == fragment.is_bold
                    && (prev.size - fragment.font_size).abs() < 0.5
                    && (prev.y - fragment.position.y).abs() <= MERGE_GAP_FACTOR * fragment.font_size
                    && !self.opens_heading(text);
                if continues {
                    prev.text.push(' ');
                    prev.text.push_str(text);
                    prev.y = fragment.position.y;
                    continue;
                }
            }
            lines.push(Line::Heading(PendingHeading {
                text: text.to_string(),
                page: fragment.page,
                size: fragment.font_size,
                bold: fragment.is_bold,
                placed,
                y: fragment.position.y,
                level: HeadingLevel::H1,
            }));
        }

        assign_levels(&mut lines);
        lines
    }

    /// A numbered or keyword line starts its own heading, never a wrap.
    fn opens_heading(&self, text: &str) -> bool {
        NUMBERING.is_match(text)
            || self.rules.iter().any(|rule| match rule {
                CompiledRule::KeywordMatch(keywords) => keyword_hit(keywords, text).is_some(),
                _ => false,
            })
    }
}

/// Modal font size, weighted by character count, on a 0.5pt grid.
/// Ties go to the smaller size.
pub fn body_size(fragments: &[&Fragment]) -> f32 {
    let mut histogram: BTreeMap<i64, usize> = BTreeMap::new();
    for f in fragments {
        *histogram.entry(half_points(f.font_size)).or_default() += f.text.chars().count();
    }
    let mut best: Option<(i64, usize)> = None;
    for (&size, &count) in &histogram {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((size, count));
        }
    }
    best.map(|(size, _)| size as f32 / 2.0).unwrap_or(0.0)
}

fn half_points(size: f32) -> i64 {
    (size * 2.0).round() as i64
}

fn assign_levels(lines: &mut [Line<'_>]) {
    let mut sizes: Vec<i64> = lines
        .iter()
        .filter_map(|l| match l {
            Line::Heading(h) => Some(half_points(h.size)),
            Line::Body(_) => None,
        })
        .collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    sizes.dedup();
    let single_size = sizes.len() == 1;

    let mut previous: Option<HeadingLevel> = None;
    for line in lines.iter_mut() {
        let Line::Heading(h) = line else { continue };
        let level = if single_size {
            numbering_depth(&h.text)
                .map(|d| HeadingLevel::from_rank(d.saturating_sub(1)))
                .unwrap_or(HeadingLevel::H1)
        } else {
            let rank = sizes
                .iter()
                .position(|&s| s == half_points(h.size))
                .unwrap_or(0);
            HeadingLevel::from_rank(rank)
        };
        h.level = match previous {
            None => HeadingLevel::H1,
            Some(prev) => HeadingLevel::from_rank(level.depth().min(prev.depth() + 1)),
        };
        previous = Some(h.level);
    }
}

/// Number of components in a leading numbering prefix (`2.1` → 2).
pub fn numbering_depth(text: &str) -> Option<usize> {
    NUMBERING
        .captures(text.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().split('.').count())
}

fn strip_numbering(text: &str) -> &str {
    match NUMBERING.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

fn join_body(lines: &[Line<'_>]) -> String {
    lines
        .iter()
        .filter_map(|l| match l {
            Line::Body(f) => Some(f.text.trim()),
            Line::Heading(_) => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILLER: &str = "This paragraph carries enough ordinary body text to set the body size";

    fn detector() -> HeadingDetector {
        HeadingDetector::new(&HeadingConfig::default()).unwrap()
    }

    fn body(text: &str, page: u32) -> Fragment {
        Fragment::new(text, page, 10.0, false)
    }

    fn heading(text: &str, page: u32, size: f32) -> Fragment {
        Fragment::new(text, page, size, true)
    }

    fn titles(sections: &[Section]) -> Vec<(&str, HeadingLevel)> {
        sections
            .iter()
            .map(|s| (s.heading.text.as_str(), s.heading.level))
            .collect()
    }

    #[test]
    fn test_bold_oversized_fragment_is_heading() {
        let fragments = vec![body(FILLER, 1), heading("Results", 1, 16.0), body(FILLER, 1)];
        let sections = detector().detect(&fragments, "a.pdf", "a");
        assert!(sections.iter().any(|s| s.heading.text == "Results"));
    }

    #[test]
    fn test_levels_follow_size_rank() {
        let fragments = vec![
            heading("Survey of Methods", 1, 18.0),
            body(FILLER, 1),
            heading("Background", 1, 14.0),
            body(FILLER, 1),
            heading("Prior Systems", 2, 12.0),
            body(FILLER, 2),
            heading("Evaluation", 2, 14.0),
            body(FILLER, 2),
        ];
        let sections = detector().detect(&fragments, "a.pdf", "a");
        assert_eq!(
            titles(&sections),
            vec![
                ("Survey of Methods", HeadingLevel::H1),
                ("Background", HeadingLevel::H2),
                ("Prior Systems", HeadingLevel::H3),
                ("Evaluation", HeadingLevel::H2),
            ]
        );
        assert_eq!(sections[2].heading.page, 2);
    }

    #[test]
    fn test_parent_body_includes_children_without_their_headings() {
        let fragments = vec![
            heading("Chapter One", 1, 18.0),
            body("Opening words here.", 1),
            heading("Part A", 1, 14.0),
            body("Nested words here.", 1),
            heading("Chapter Two", 2, 18.0),
            body("Closing words here.", 2),
        ];
        let sections = detector().detect(&fragments, "a.pdf", "a");
        assert_eq!(sections[0].body_text, "Opening words here. Nested words here.");
        assert_eq!(sections[1].body_text, "Nested words here.");
        assert_eq!(sections[2].body_text, "Closing words here.");
    }

    #[test]
    fn test_preamble_dropped_by_default() {
        let fragments = vec![body("Front matter.", 1), heading("Introduction", 1, 16.0), body(FILLER, 1)];
        let sections = detector().detect(&fragments, "a.pdf", "Paper");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].heading.text, "Introduction");
    }

    #[test]
    fn test_preamble_synthesized_when_configured() {
        let config = HeadingConfig {
            preamble: PreamblePolicy::Synthesize,
            ..HeadingConfig::default()
        };
        let fragments = vec![body("Front matter.", 1), heading("Introduction", 1, 16.0), body(FILLER, 1)];
        let sections = HeadingDetector::new(&config).unwrap().detect(&fragments, "a.pdf", "Paper");
        assert_eq!(titles(&sections), vec![("Paper", HeadingLevel::H1), ("Introduction", HeadingLevel::H1)]);
        assert_eq!(sections[0].body_text, "Front matter.");
    }

    #[test]
    fn test_no_headings_yields_one_section() {
        let fragments = vec![body("Only body text here.", 2), body("More of it.", 3)];
        let sections = detector().detect(&fragments, "notes.pdf", "notes");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].heading.text, "notes");
        assert_eq!(sections[0].heading.level, HeadingLevel::H1);
        assert_eq!(sections[0].heading.page, 2);
        assert_eq!(sections[0].body_text, "Only body text here. More of it.");
    }

    #[test]
    fn test_empty_and_malformed_input() {
        assert!(detector().detect(&[], "a.pdf", "a").is_empty());
        let junk = vec![Fragment::new("  ", 1, 12.0, true), Fragment::new("x", 1, f32::NAN, false)];
        assert!(detector().detect(&junk, "a.pdf", "a").is_empty());
    }

    #[test]
    fn test_wrapped_heading_lines_merge() {
        let fragments = vec![
            heading("A Study of Layout", 1, 16.0).at(72.0, 700.0),
            heading("Heuristics in Practice", 1, 16.0).at(72.0, 682.0),
            body(FILLER, 1).at(72.0, 650.0),
        ];
        let sections = detector().detect(&fragments, "a.pdf", "a");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].heading.text, "A Study of Layout Heuristics in Practice");
    }

    #[test]
    fn test_numbering_decides_levels_for_uniform_sizes() {
        let fragments = vec![
            Fragment::new("1. Introduction", 1, 10.0, true),
            body(FILLER, 1).at(0.0, 100.0),
            Fragment::new("1.1 Scope", 1, 10.0, true).at(0.0, 200.0),
            body(FILLER, 1).at(0.0, 300.0),
            Fragment::new("1.1.1 Limits", 1, 10.0, true).at(0.0, 400.0),
            body(FILLER, 1).at(0.0, 500.0),
            Fragment::new("2. Methods", 2, 10.0, true),
            body(FILLER, 2).at(0.0, 100.0),
        ];
        let sections = detector().detect(&fragments, "a.pdf", "a");
        assert_eq!(
            titles(&sections),
            vec![
                ("1. Introduction", HeadingLevel::H1),
                ("1.1 Scope", HeadingLevel::H2),
                ("1.1.1 Limits", HeadingLevel::H3),
                ("2. Methods", HeadingLevel::H1),
            ]
        );
    }

    #[test]
    fn test_levels_clamped_to_one_step_deeper() {
        let fragments = vec![
            heading("Small First", 1, 12.0),
            body(FILLER, 1),
            heading("Big Second", 1, 18.0),
            body(FILLER, 1),
            heading("Tiny Third", 1, 12.0),
            body(FILLER, 1),
        ];
        let sections = detector().detect(&fragments, "a.pdf", "a");
        let levels: Vec<HeadingLevel> = sections.iter().map(|s| s.heading.level).collect();
        assert_eq!(levels, vec![HeadingLevel::H1, HeadingLevel::H1, HeadingLevel::H2]);
    }

    #[test]
    fn test_keyword_heading_at_body_size() {
        let fragments = vec![
            body(FILLER, 1),
            body("Abstract", 1),
            body(FILLER, 1),
            Fragment::new("3 Results and Discussion", 1, 10.0, true),
            body(FILLER, 1),
        ];
        let sections = detector().detect(&fragments, "a.pdf", "a");
        let names: Vec<&str> = sections.iter().map(|s| s.heading.text.as_str()).collect();
        assert_eq!(names, vec!["Abstract", "3 Results and Discussion"]);
    }

    #[test]
    fn test_plain_line_starting_with_keyword_is_body() {
        let d = detector();
        assert_eq!(d.classify(&body("approach for each site", 1), 10.0), None);
        assert_eq!(d.classify(&body("Approach", 1), 10.0), Some("keyword_match"));
        assert_eq!(
            d.classify(&Fragment::new("approach for each site", 1, 10.0, true), 10.0),
            Some("keyword_match")
        );
    }

    #[test]
    fn test_adjacent_numbered_headings_stay_separate() {
        let fragments = vec![
            body(FILLER, 1).at(72.0, 720.0),
            Fragment::new("2.1 Scope", 1, 10.0, true).at(72.0, 700.0),
            Fragment::new("2.2 Limits", 1, 10.0, true).at(72.0, 686.0),
            body(FILLER, 1).at(72.0, 672.0),
        ];
        let sections = detector().detect(&fragments, "a.pdf", "a");
        let names: Vec<&str> = sections.iter().map(|s| s.heading.text.as_str()).collect();
        assert_eq!(names, vec!["2.1 Scope", "2.2 Limits"]);
        assert_eq!(sections[1].body_text, FILLER);
    }

    #[test]
    fn test_unplaced_headings_never_merge() {
        let fragments = vec![
            heading("Overview of Tools", 1, 16.0),
            heading("Setup Steps", 1, 16.0),
            body(FILLER, 1),
        ];
        let sections = detector().detect(&fragments, "a.json", "a");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].heading.text, "Setup Steps");
    }

    #[test]
    fn test_markdown_sibling_headings_stay_separate() {
        let doc = crate::loader::parse_markdown("# Guide\nIntro text here.\n## Install\n## Usage\nRun the tool.");
        let sections = detector().detect(&doc.fragments, "guide.md", "guide");
        assert_eq!(
            titles(&sections),
            vec![
                ("Guide", HeadingLevel::H1),
                ("Install", HeadingLevel::H2),
                ("Usage", HeadingLevel::H2),
            ]
        );
        assert_eq!(sections[2].body_text, "Run the tool.");
    }

    #[test]
    fn test_sentences_are_not_headings() {
        let d = detector();
        assert_eq!(d.classify(&heading("This is a sentence.", 1, 20.0), 10.0), None);
        let long = "word ".repeat(16);
        assert_eq!(d.classify(&heading(&long, 1, 20.0), 10.0), None);
        assert_eq!(d.classify(&heading("Overview", 1, 20.0), 10.0), Some("font_ratio"));
        assert_eq!(d.classify(&Fragment::new("2.1 Data Sources", 1, 10.0, true), 10.0), Some("bold_pattern"));
    }

    #[test]
    fn test_rule_priority_ignores_config_order() {
        let config = HeadingConfig {
            rules: vec![
                Rule::KeywordMatch { keywords: vec!["overview".into()] },
                Rule::FontRatio { min_ratio: 1.2 },
            ],
            ..HeadingConfig::default()
        };
        let d = HeadingDetector::new(&config).unwrap();
        assert_eq!(d.classify(&heading("Overview", 1, 20.0), 10.0), Some("font_ratio"));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let config = HeadingConfig {
            rules: vec![Rule::BoldPattern { patterns: vec!["([".into()] }],
            ..HeadingConfig::default()
        };
        assert!(matches!(HeadingDetector::new(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_body_size_is_char_weighted_mode() {
        let a = Fragment::new("short", 1, 14.0, false);
        let b = Fragment::new("a much longer run of body text", 1, 10.2, false);
        assert_eq!(body_size(&[&a, &b]), 10.0);
        let c = Fragment::new("abcd", 1, 12.0, false);
        let d = Fragment::new("wxyz", 1, 9.0, false);
        assert_eq!(body_size(&[&c, &d]), 9.0);
    }

    #[test]
    fn test_outline_title_and_entries() {
        let fragments = vec![
            heading("Field Guide", 1, 20.0),
            body(FILLER, 1),
            heading("Birds", 2, 14.0),
            body(FILLER, 2),
        ];
        let d = detector();
        let outline = d.outline(&fragments, None);
        assert_eq!(outline.title, "Field Guide");
        assert_eq!(outline.outline.len(), 2);
        assert_eq!(outline.outline[1].level, HeadingLevel::H2);
        assert_eq!(outline.outline[1].page, 2);

        assert_eq!(d.outline(&fragments, Some("Given")).title, "Given");
        assert_eq!(d.outline(&[], None), Outline::default());
    }
}
