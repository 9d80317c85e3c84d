//! Configuration: run paths and the analyzer's tunable tables.
//!
//! Every heuristic table (heading rules, persona archetypes, job phrases)
//! lives here as plain data so tests can swap in synthetic personas.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};

pub const INPUT_FILE_NAME: &str = "input.json";
pub const OUTPUT_FILE_NAME: &str = "output.json";

/// Input/output locations for one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Directory holding the documents and `input.json`.
    pub input_dir: PathBuf,
    /// Directory receiving `output.json` (and outline files).
    pub output_dir: PathBuf,
    /// `<input_dir>/input.json`.
    pub input_file: PathBuf,
    /// `<output_dir>/output.json`.
    pub output_file: PathBuf,
}

impl DataPaths {
    /// Resolve run paths. Creates the output directory if needed.
    pub fn new(input_dir: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let input_dir = input_dir.as_ref().to_path_buf();
        let output_dir = output_dir.as_ref().to_path_buf();
        let paths = Self {
            input_file: input_dir.join(INPUT_FILE_NAME),
            output_file: output_dir.join(OUTPUT_FILE_NAME),
            input_dir,
            output_dir,
        };
        std::fs::create_dir_all(&paths.output_dir)?;
        Ok(paths)
    }
}

/// Heading classifier rule. Rules are evaluated in a fixed priority
/// order (see [`Rule::priority`]), not in the order they are listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Rule {
    /// Font size at least `min_ratio` times the body size.
    FontRatio { min_ratio: f32 },
    /// Bold text matching one of the regexes.
    BoldPattern { patterns: Vec<String> },
    /// Text (minus numbering) naming a well-known section.
    KeywordMatch { keywords: Vec<String> },
}

impl Rule {
    pub fn priority(&self) -> u8 {
        match self {
            Self::FontRatio { .. } => 0,
            Self::BoldPattern { .. } => 1,
            Self::KeywordMatch { .. } => 2,
        }
    }
}

/// What to do with body text that precedes the first heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreamblePolicy {
    #[default]
    Drop,
    Synthesize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingConfig {
    pub rules: Vec<Rule>,
    pub max_heading_words: usize,
    pub max_heading_chars: usize,
    pub preamble: PreamblePolicy,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                Rule::FontRatio { min_ratio: 1.1 },
                Rule::BoldPattern {
                    patterns: [
                        r"^\d+\.\s+\S",
                        r"^\d+(\.\d+)+\.?\s+\S",
                        r"^[A-Z][A-Z0-9 ,:&'\-]{2,}$",
                        r"^[A-Z][\w'\-]*(\s+([A-Z][\w'\-]*|of|and|the|in|for|on|to|a|an|with))*:?$",
                    ]
                    .iter()
                    .map(|p| p.to_string())
                    .collect(),
                },
                Rule::KeywordMatch {
                    keywords: [
                        "abstract",
                        "introduction",
                        "background",
                        "related work",
                        "literature review",
                        "methodology",
                        "methods",
                        "approach",
                        "experiments",
                        "evaluation",
                        "results",
                        "discussion",
                        "conclusion",
                        "conclusions",
                        "future work",
                        "summary",
                        "executive summary",
                        "overview",
                        "references",
                        "bibliography",
                        "acknowledgments",
                        "acknowledgements",
                        "appendix",
                    ]
                    .iter()
                    .map(|k| k.to_string())
                    .collect(),
                },
            ],
            max_heading_words: 15,
            max_heading_chars: 200,
            preamble: PreamblePolicy::Drop,
        }
    }
}

/// A persona archetype: how to recognise it in a role string and which
/// terms it cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaArchetype {
    pub name: String,
    /// Substrings of the lowercased role that select this archetype.
    pub triggers: Vec<String>,
    pub keywords: Vec<String>,
    /// Structural markers that earn the persona-context bonus.
    pub markers: Vec<String>,
    #[serde(default = "default_archetype_weight")]
    pub weight: f64,
}

fn default_archetype_weight() -> f64 {
    1.0
}

/// Task phrase that shifts scoring toward particular sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRule {
    /// Substrings of the lowercased task that activate this rule.
    pub phrases: Vec<String>,
    /// Extra keyword terms added at job weight.
    pub boost_terms: Vec<String>,
    /// Heading substrings earning the full job-alignment bonus.
    pub heading_patterns: Vec<String>,
    /// Body substrings earning the reduced job-alignment bonus.
    pub markers: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn archetype(name: &str, triggers: &[&str], keywords: &[&str], markers: &[&str]) -> PersonaArchetype {
    PersonaArchetype {
        name: name.to_string(),
        triggers: strings(triggers),
        keywords: strings(keywords),
        markers: strings(markers),
        weight: 1.0,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub archetypes: Vec<PersonaArchetype>,
    pub job_rules: Vec<JobRule>,
    /// Weight for role words when no archetype matches.
    pub fallback_role_weight: f64,
    /// Weight for task words; higher than persona terms.
    pub job_term_weight: f64,
    pub max_job_terms: usize,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        let money_markers = &["revenue", "profit", "market", "growth", "financial"];
        Self {
            archetypes: vec![
                archetype(
                    "researcher",
                    &["researcher", "research", "phd", "scientist", "postdoc"],
                    &[
                        "methodology", "analysis", "results", "conclusion", "literature", "study",
                        "research", "hypothesis", "experiment", "data", "findings", "review",
                        "survey",
                    ],
                    &["methodology", "results", "analysis", "conclusion", "study"],
                ),
                archetype(
                    "student",
                    &["student", "undergraduate", "learner", "pupil"],
                    &[
                        "concept", "definition", "example", "problem", "solution", "exercise",
                        "theory", "principle", "formula", "equation", "practice", "learn",
                    ],
                    &["concept", "definition", "example", "theory", "principle"],
                ),
                archetype(
                    "analyst",
                    &["analyst", "trend", "performance"],
                    &[
                        "trend", "performance", "metric", "revenue", "growth", "profit", "market",
                        "strategy", "forecast", "benchmark", "comparison", "financial",
                    ],
                    money_markers,
                ),
                archetype(
                    "investment",
                    &["investment", "investor", "portfolio"],
                    &[
                        "revenue", "profit", "growth", "market", "competition", "strategy", "risk",
                        "return", "valuation", "investment", "portfolio",
                    ],
                    money_markers,
                ),
                archetype(
                    "business",
                    &["business", "manager", "entrepreneur", "consultant"],
                    &[
                        "strategy", "market", "revenue", "profit", "growth", "customer",
                        "product", "service", "competition", "opportunity",
                    ],
                    money_markers,
                ),
                archetype(
                    "technical",
                    &["engineer", "developer", "technical", "architect"],
                    &[
                        "implementation", "architecture", "design", "system", "algorithm",
                        "performance", "optimization", "technology", "framework",
                    ],
                    &["implementation", "architecture", "algorithm", "design"],
                ),
                archetype(
                    "academic",
                    &["academic", "professor", "lecturer", "teacher"],
                    &[
                        "theory", "concept", "principle", "methodology", "analysis", "study",
                        "research", "literature", "review", "hypothesis",
                    ],
                    &["theory", "concept", "principle", "methodology"],
                ),
                archetype(
                    "chemistry",
                    &["chemist", "reaction", "mechanism"],
                    &[
                        "reaction", "mechanism", "kinetics", "thermodynamics", "equilibrium",
                        "catalyst", "synthesis", "molecule", "compound", "bond",
                    ],
                    &["reaction", "mechanism", "kinetics"],
                ),
                archetype(
                    "biology",
                    &["biolog", "cell", "protein"],
                    &[
                        "cell", "protein", "gene", "organism", "metabolism", "pathway",
                        "structure", "function", "evolution", "ecology",
                    ],
                    &["cell", "protein", "gene"],
                ),
                archetype(
                    "physics",
                    &["physic", "force", "energy"],
                    &[
                        "force", "energy", "momentum", "wave", "particle", "field", "quantum",
                        "relativity", "mechanics", "thermodynamics",
                    ],
                    &["force", "energy", "quantum"],
                ),
                archetype(
                    "journalist",
                    &["journalist", "reporter", "editor"],
                    &[
                        "interview", "source", "report", "event", "timeline", "quote", "impact",
                        "public", "statement", "investigation",
                    ],
                    &["according to", "reported", "statement", "interview"],
                ),
            ],
            job_rules: vec![
                JobRule {
                    phrases: strings(&["literature review"]),
                    boost_terms: strings(&[
                        "methodology", "results", "conclusion", "analysis", "comparison",
                    ]),
                    heading_patterns: strings(&[
                        "method", "background", "related work", "literature", "approach",
                        "results",
                    ]),
                    markers: strings(&["methodology", "approach", "results"]),
                },
                JobRule {
                    phrases: strings(&["exam", "study"]),
                    boost_terms: strings(&["concept", "definition", "example", "theory", "practice"]),
                    heading_patterns: strings(&["concept", "definition", "example", "summary", "key"]),
                    markers: strings(&["concept", "definition", "example"]),
                },
                JobRule {
                    phrases: strings(&["financial", "revenue"]),
                    boost_terms: strings(&["revenue", "profit", "growth", "market", "financial"]),
                    heading_patterns: strings(&["financial", "revenue", "performance", "results"]),
                    markers: strings(&["revenue", "profit", "financial"]),
                },
            ],
            fallback_role_weight: 1.0,
            job_term_weight: 1.5,
            max_job_terms: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Sections with fewer tokens get a proportional length penalty.
    pub min_tokens: usize,
    /// Sections with more tokens get an inverse length penalty.
    pub max_tokens: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_tokens: 20,
            max_tokens: 400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStrategy {
    /// Leading sentences in document order.
    #[default]
    Leading,
    /// Highest-scoring sentences, restored to document order.
    Salient,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub strategy: SummaryStrategy,
    pub max_sentences: usize,
    pub max_chars: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            strategy: SummaryStrategy::Leading,
            max_sentences: 5,
            max_chars: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub top_n: usize,
    pub top_k: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { top_n: 5, top_k: 3 }
    }
}

/// Top-level analyzer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub heading: HeadingConfig,
    pub keywords: KeywordConfig,
    pub scoring: ScoringConfig,
    pub summary: SummaryConfig,
    pub ranking: RankingConfig,
    /// Wall-clock budget for one run, in seconds.
    pub time_budget_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            heading: HeadingConfig::default(),
            keywords: KeywordConfig::default(),
            scoring: ScoringConfig::default(),
            summary: SummaryConfig::default(),
            ranking: RankingConfig::default(),
            time_budget_secs: 60,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from an optional JSON file, then apply environment
    /// overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                let config: AnalyzerConfig = serde_json::from_str(&raw).map_err(|e| {
                    Error::Config(format!("invalid config {}: {}", path.display(), e))
                })?;
                info!("Loaded analyzer config from {}", path.display());
                config
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `DOCSAGE_TOP_N` / `DOCSAGE_TOP_K` style overrides.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(n) = lookup("DOCSAGE_TOP_N").and_then(|v| v.parse().ok()) {
            self.ranking.top_n = n;
        }
        if let Some(k) = lookup("DOCSAGE_TOP_K").and_then(|v| v.parse().ok()) {
            self.ranking.top_k = k;
        }
    }

    pub fn validate(&self) -> Result<()> {
        for rule in &self.heading.rules {
            if let Rule::FontRatio { min_ratio } = rule {
                if !min_ratio.is_finite() || *min_ratio < 1.0 {
                    return Err(Error::Config(format!(
                        "font ratio must be >= 1.0, got {}",
                        min_ratio
                    )));
                }
            }
        }
        if self.scoring.min_tokens > self.scoring.max_tokens {
            return Err(Error::Config(format!(
                "min_tokens ({}) exceeds max_tokens ({})",
                self.scoring.min_tokens, self.scoring.max_tokens
            )));
        }
        if self.summary.max_chars < 4 {
            return Err(Error::Config("summary max_chars must be at least 4".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_output_contract() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.ranking.top_n, 5);
        assert_eq!(config.ranking.top_k, 3);
        assert_eq!(config.time_budget_secs, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AnalyzerConfig =
            serde_json::from_str(r#"{"ranking": {"top_n": 8}}"#).unwrap();
        assert_eq!(config.ranking.top_n, 8);
        assert_eq!(config.ranking.top_k, 3);
        assert_eq!(config.heading.rules.len(), 3);
    }

    #[test]
    fn test_rule_tagged_by_kind() {
        let rule: Rule = serde_json::from_str(r#"{"kind":"FontRatio","min_ratio":1.3}"#).unwrap();
        assert_eq!(rule, Rule::FontRatio { min_ratio: 1.3 });
        assert_eq!(rule.priority(), 0);
    }

    #[test]
    fn test_overrides() {
        let mut config = AnalyzerConfig::default();
        config.apply_overrides(|key| match key {
            "DOCSAGE_TOP_N" => Some("7".into()),
            "DOCSAGE_TOP_K" => Some("not-a-number".into()),
            _ => None,
        });
        assert_eq!(config.ranking.top_n, 7);
        assert_eq!(config.ranking.top_k, 3);
    }

    #[test]
    fn test_validate_rejects_bad_ratio() {
        let mut config = AnalyzerConfig::default();
        config.heading.rules = vec![Rule::FontRatio { min_ratio: 0.5 }];
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"scoring": {"min_tokens": 5, "max_tokens": 50}}"#).unwrap();
        let config = AnalyzerConfig::load(Some(&path)).unwrap();
        assert_eq!(config.scoring.min_tokens, 5);
        assert_eq!(config.scoring.max_tokens, 50);

        let missing = dir.path().join("missing.json");
        assert!(matches!(AnalyzerConfig::load(Some(&missing)), Err(Error::Config(_))));
    }

    #[test]
    fn test_data_paths_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let paths = DataPaths::new(dir.path(), &out).unwrap();
        assert!(out.is_dir());
        assert_eq!(paths.input_file, dir.path().join("input.json"));
        assert_eq!(paths.output_file, out.join("output.json"));
    }
}
