//! Persona + job → weighted keyword model.

use tracing::{info, warn};

use docsage_core::config::KeywordConfig;
use docsage_ingest::text::tokenize;

use crate::types::KeywordModel;

/// Builds a [`KeywordModel`] from a persona role and a job description.
#[derive(Debug, Clone, Default)]
pub struct KeywordModelBuilder {
    config: KeywordConfig,
}

impl KeywordModelBuilder {
    pub fn new(config: KeywordConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, persona_role: &str, job_task: &str) -> KeywordModel {
        let role = persona_role.to_lowercase();
        let task = job_task.to_lowercase();
        let mut model = KeywordModel::default();

        for archetype in &self.config.archetypes {
            let hit = archetype
                .triggers
                .iter()
                .map(|t| t.trim().to_lowercase())
                .any(|t| !t.is_empty() && role.contains(&t));
            if !hit {
                continue;
            }
            model.archetypes.push(archetype.name.clone());
            for keyword in &archetype.keywords {
                for token in tokenize(keyword) {
                    model.add_term(token, archetype.weight);
                }
            }
            extend_unique(&mut model.persona_markers, &archetype.markers);
        }

        if model.archetypes.is_empty() {
            for token in tokenize(&role) {
                model.add_term(token, self.config.fallback_role_weight);
            }
        }

        for token in tokenize(&task).into_iter().take(self.config.max_job_terms) {
            model.add_term(token, self.config.job_term_weight);
        }

        for rule in &self.config.job_rules {
            let active = rule
                .phrases
                .iter()
                .map(|p| p.trim().to_lowercase())
                .any(|p| !p.is_empty() && task.contains(&p));
            if !active {
                continue;
            }
            for term in &rule.boost_terms {
                for token in tokenize(term) {
                    model.add_term(token, self.config.job_term_weight);
                }
            }
            extend_unique(&mut model.job_heading_patterns, &rule.heading_patterns);
            extend_unique(&mut model.job_markers, &rule.markers);
        }

        if model.terms.is_empty() {
            warn!(
                "No keywords for persona {:?} and task {:?}; relevance will rely on length alone",
                persona_role, job_task
            );
        } else {
            info!(
                "Keyword model: {} terms, archetypes [{}]",
                model.terms.len(),
                model.archetypes.join(", ")
            );
        }
        model
    }
}

fn extend_unique(target: &mut Vec<String>, items: &[String]) {
    for item in items {
        let item = item.trim().to_lowercase();
        if !item.is_empty() && !target.contains(&item) {
            target.push(item);
        }
    }
}
