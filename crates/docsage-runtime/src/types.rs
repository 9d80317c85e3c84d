//! Runtime types: the run descriptor and per-run bookkeeping.

use serde::{Deserialize, Serialize};

use crate::report::Report;

/// One entry of `input.json`'s document list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobToBeDone {
    #[serde(default)]
    pub task: String,
}

/// Contents of `input.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDescriptor {
    pub documents: Vec<DocumentRef>,
    #[serde(default)]
    pub persona: Persona,
    #[serde(default)]
    pub job_to_be_done: JobToBeDone,
}

/// What happened to a document during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DocumentStatus {
    Processed { sections: usize },
    /// No extractable text.
    Empty,
    /// Same content as a document processed earlier in the run.
    Duplicate,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentOutcome {
    pub filename: String,
    #[serde(flatten)]
    pub status: DocumentStatus,
}

/// Per-run bookkeeping, logged at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub documents: Vec<DocumentOutcome>,
    pub sections_scored: usize,
    pub elapsed_ms: u64,
    pub budget_exceeded: bool,
}

impl RunSummary {
    pub fn processed(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d.status, DocumentStatus::Processed { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| matches!(d.status, DocumentStatus::Failed { .. }))
            .count()
    }
}

/// Result of analyzing one descriptor.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub report: Report,
    pub summary: RunSummary,
}
