//! Global section ranking across documents.

use tracing::debug;

use docsage_core::config::RankingConfig;
use docsage_core::{RankedResult, ScoredSection, SectionSummary};

#[derive(Debug, Clone, Copy)]
pub struct SectionRanker {
    top_n: usize,
    top_k: usize,
}

impl SectionRanker {
    /// `top_k` is clamped to `top_n`.
    pub fn new(config: &RankingConfig) -> Self {
        Self {
            top_n: config.top_n,
            top_k: config.top_k.min(config.top_n),
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Order sections, keep the best `top_n` and summarize the first `top_k`.
    pub fn rank<F>(&self, mut sections: Vec<ScoredSection>, mut summarize: F) -> RankedResult
    where
        F: FnMut(&ScoredSection) -> String,
    {
        let total = sections.len();
        sections.sort_by(|a, b| a.rank_cmp(b));
        sections.truncate(self.top_n);

        let top_summaries = sections
            .iter()
            .take(self.top_k)
            .map(|s| SectionSummary {
                refined_text: summarize(s),
                section: s.clone(),
            })
            .collect();

        debug!("Ranked {} sections, kept {}", total, sections.len());
        RankedResult {
            top_sections: sections,
            top_summaries,
        }
    }
}

impl Default for SectionRanker {
    fn default() -> Self {
        Self::new(&RankingConfig::default())
    }
}
