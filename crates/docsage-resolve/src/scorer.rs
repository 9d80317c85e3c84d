//! Section relevance scoring.
//!
//! A score is a fixed linear blend of four factors, each computed from the
//! section alone, so scores are comparable across documents.

use docsage_core::config::ScoringConfig;
use docsage_core::{ScoredSection, Section};
use docsage_ingest::text::tokenize;

use crate::types::{KeywordModel, ScoreFactors};

pub const KEYWORD_WEIGHT: f64 = 0.5;
pub const PERSONA_WEIGHT: f64 = 0.2;
pub const JOB_WEIGHT: f64 = 0.2;
pub const LENGTH_WEIGHT: f64 = 0.1;

pub const PERSONA_BONUS: f64 = 1.0;
pub const JOB_HEADING_BONUS: f64 = 1.0;
pub const JOB_BODY_BONUS: f64 = 0.5;

#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer {
    config: ScoringConfig,
}

impl RelevanceScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn factors(&self, section: &Section, model: &KeywordModel) -> ScoreFactors {
        let text = section.full_text();
        let tokens = tokenize(&text);

        let keyword_density = if tokens.is_empty() {
            0.0
        } else {
            tokens.iter().map(|t| model.weight(t)).sum::<f64>() / tokens.len() as f64
        };

        let lower = text.to_lowercase();
        let persona_bonus = if model.persona_markers.iter().any(|m| lower.contains(m.as_str())) {
            PERSONA_BONUS
        } else {
            0.0
        };

        let heading = section.heading.text.to_lowercase();
        let body = section.body_text.to_lowercase();
        let job_bonus = if model
            .job_heading_patterns
            .iter()
            .any(|p| heading.contains(p.as_str()))
        {
            JOB_HEADING_BONUS
        } else if model.job_markers.iter().any(|m| body.contains(m.as_str())) {
            JOB_BODY_BONUS
        } else {
            0.0
        };

        ScoreFactors {
            keyword_density,
            persona_bonus,
            job_bonus,
            length_quality: self.length_quality(tokens.len()),
        }
    }

    pub fn score(&self, section: &Section, model: &KeywordModel) -> f64 {
        combine(&self.factors(section, model))
    }

    /// Score a section and record its factors on it.
    pub fn score_section(&self, mut section: Section, model: &KeywordModel) -> ScoredSection {
        let factors = self.factors(&section, model);
        section.raw_score_factors = factors.to_map();
        ScoredSection::new(section, combine(&factors))
    }

    fn length_quality(&self, tokens: usize) -> f64 {
        let (min, max) = (self.config.min_tokens, self.config.max_tokens);
        if tokens == 0 {
            0.0
        } else if tokens < min {
            tokens as f64 / min as f64
        } else if tokens > max {
            max as f64 / tokens as f64
        } else {
            1.0
        }
    }
}

fn combine(f: &ScoreFactors) -> f64 {
    KEYWORD_WEIGHT * f.keyword_density
        + PERSONA_WEIGHT * f.persona_bonus
        + JOB_WEIGHT * f.job_bonus
        + LENGTH_WEIGHT * f.length_quality
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::KeywordModelBuilder;
    use docsage_core::{Heading, HeadingLevel};

    fn section(heading: &str, body: &str) -> Section {
        let heading = Heading {
            level: HeadingLevel::H1,
            text: heading.into(),
            page: 1,
        };
        Section::new("paper.pdf", heading, body)
    }

    fn research_model() -> KeywordModel {
        KeywordModelBuilder::default().build(
            "PhD Researcher in Computational Biology",
            "Prepare a literature review focusing on methodologies",
        )
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total = KEYWORD_WEIGHT + PERSONA_WEIGHT + JOB_WEIGHT + LENGTH_WEIGHT;
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_methodology_beats_acknowledgments() {
        let model = research_model();
        let scorer = RelevanceScorer::default();
        let methods = section(
            "Methodology",
            "We describe the experimental methodology and data analysis used in this study, \
             including sampling, sequencing and the statistical approach applied to results.",
        );
        let thanks = section(
            "Acknowledgments",
            "We thank our colleagues and the funding agency for their generous support.",
        );
        assert!(scorer.score(&methods, &model) > scorer.score(&thanks, &model));
    }

    #[test]
    fn test_factors_and_bonuses() {
        let model = research_model();
        let scorer = RelevanceScorer::default();

        let f = scorer.factors(&section("Related Work", "Prior results are compared."), &model);
        assert_eq!(f.job_bonus, JOB_HEADING_BONUS);
        assert_eq!(f.persona_bonus, PERSONA_BONUS);

        let f = scorer.factors(&section("Setup", "Our approach is simple."), &model);
        assert_eq!(f.job_bonus, JOB_BODY_BONUS);
        assert_eq!(f.persona_bonus, 0.0);
    }

    #[test]
    fn test_length_quality_bounds() {
        let scorer = RelevanceScorer::new(ScoringConfig {
            min_tokens: 4,
            max_tokens: 8,
        });
        assert_eq!(scorer.length_quality(0), 0.0);
        assert_eq!(scorer.length_quality(2), 0.5);
        assert_eq!(scorer.length_quality(6), 1.0);
        assert_eq!(scorer.length_quality(16), 0.5);
    }

    #[test]
    fn test_empty_model_scores_length_only() {
        let scorer = RelevanceScorer::default();
        let s = section("Notes", "plain words appear here without anything special");
        let f = scorer.factors(&s, &KeywordModel::default());
        assert_eq!(f.keyword_density, 0.0);
        assert_eq!(f.persona_bonus, 0.0);
        assert_eq!(f.job_bonus, 0.0);
        assert!(scorer.score(&s, &KeywordModel::default()) >= 0.0);
    }

    #[test]
    fn test_score_section_is_deterministic_and_records_factors() {
        let model = research_model();
        let scorer = RelevanceScorer::default();
        let s = section("Results", "The results of the analysis are shown below.");
        let a = scorer.score_section(s.clone(), &model);
        let b = scorer.score_section(s, &model);
        assert_eq!(a.score, b.score);
        assert_eq!(a.section.raw_score_factors.len(), 4);
        let f = &a.section.raw_score_factors;
        let recombined = KEYWORD_WEIGHT * f["keyword_density"]
            + PERSONA_WEIGHT * f["persona_bonus"]
            + JOB_WEIGHT * f["job_bonus"]
            + LENGTH_WEIGHT * f["length_quality"];
        assert!((recombined - a.score).abs() < 1e-12);
    }
}
