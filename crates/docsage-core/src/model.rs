//! Document model shared by every pipeline stage: fragments, headings,
//! sections, scored sections and the ranked result.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Page-space coordinates of a fragment's origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// A span of document text annotated with layout metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub page: u32,
    pub font_size: f32,
    #[serde(default)]
    pub is_bold: bool,
    #[serde(default)]
    pub position: Position,
}

impl Fragment {
    pub fn new(text: impl Into<String>, page: u32, font_size: f32, is_bold: bool) -> Self {
        Self {
            text: text.into(),
            page,
            font_size,
            is_bold,
            position: Position::default(),
        }
    }

    /// Builder-style position setter.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Position { x, y };
        self
    }

    /// A fragment is usable when it carries text and a sane font size.
    pub fn is_well_formed(&self) -> bool {
        !self.text.trim().is_empty() && self.font_size.is_finite() && self.font_size > 0.0
    }
}

/// Outline depth. Anything deeper than three tiers collapses into `H3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Map a zero-based size rank (0 = largest) to a level.
    pub fn from_rank(rank: usize) -> Self {
        match rank {
            0 => Self::H1,
            1 => Self::H2,
            _ => Self::H3,
        }
    }

    /// Zero-based depth (H1 = 0).
    pub fn depth(self) -> usize {
        match self {
            Self::H1 => 0,
            Self::H2 => 1,
            Self::H3 => 2,
        }
    }
}

impl std::fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::H1 => write!(f, "H1"),
            Self::H2 => write!(f, "H2"),
            Self::H3 => write!(f, "H3"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub level: HeadingLevel,
    pub text: String,
    pub page: u32,
}

/// A heading plus the body text it governs within one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: Heading,
    pub document_id: String,
    pub body_text: String,
    /// Individual scoring factors, filled in by the scorer.
    #[serde(default)]
    pub raw_score_factors: BTreeMap<String, f64>,
}

impl Section {
    pub fn new(document_id: impl Into<String>, heading: Heading, body_text: impl Into<String>) -> Self {
        Self {
            heading,
            document_id: document_id.into(),
            body_text: body_text.into(),
            raw_score_factors: BTreeMap::new(),
        }
    }

    /// Heading and body joined, the text the scorer looks at.
    pub fn full_text(&self) -> String {
        if self.body_text.is_empty() {
            self.heading.text.clone()
        } else {
            format!("{} {}", self.heading.text, self.body_text)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSection {
    pub section: Section,
    pub score: f64,
}

impl ScoredSection {
    pub fn new(section: Section, score: f64) -> Self {
        Self { section, score }
    }

    /// Ranking order: score descending, then document, page and heading
    /// text ascending.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.section.document_id.cmp(&other.section.document_id))
            .then_with(|| self.section.heading.page.cmp(&other.section.heading.page))
            .then_with(|| self.section.heading.text.cmp(&other.section.heading.text))
    }
}

/// A top-ranked section together with its refined extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub section: ScoredSection,
    pub refined_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub top_sections: Vec<ScoredSection>,
    pub top_summaries: Vec<SectionSummary>,
}

/// One outline entry, as written by the outline export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: HeadingLevel,
    pub text: String,
    pub page: u32,
}

/// Title and heading outline of a single document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
}
