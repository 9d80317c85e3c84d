//! Resolver types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Weighted terms describing what a persona and task care about.
///
/// Terms are stemmed tokens. Markers and patterns are lowercase substrings
/// matched against lowercased section text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordModel {
    pub terms: BTreeMap<String, f64>,
    /// Markers whose presence earns the persona-context bonus.
    pub persona_markers: Vec<String>,
    /// Heading substrings that earn the full job-alignment bonus.
    pub job_heading_patterns: Vec<String>,
    /// Body substrings that earn the reduced job-alignment bonus.
    pub job_markers: Vec<String>,
    /// Names of the archetypes that matched the persona.
    pub archetypes: Vec<String>,
}

impl KeywordModel {
    /// Weight of a stemmed token, zero when unknown.
    pub fn weight(&self, token: &str) -> f64 {
        self.terms.get(token).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
            && self.persona_markers.is_empty()
            && self.job_heading_patterns.is_empty()
            && self.job_markers.is_empty()
    }

    /// Insert a term, keeping the larger weight on collision.
    pub fn add_term(&mut self, term: String, weight: f64) {
        let entry = self.terms.entry(term).or_insert(weight);
        if weight > *entry {
            *entry = weight;
        }
    }
}

/// Individual components of a relevance score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreFactors {
    pub keyword_density: f64,
    pub persona_bonus: f64,
    pub job_bonus: f64,
    pub length_quality: f64,
}

impl ScoreFactors {
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("keyword_density".to_string(), self.keyword_density),
            ("persona_bonus".to_string(), self.persona_bonus),
            ("job_bonus".to_string(), self.job_bonus),
            ("length_quality".to_string(), self.length_quality),
        ])
    }
}
