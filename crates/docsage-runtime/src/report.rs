//! `output.json` report shape and assembly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docsage_core::RankedResult;

use crate::types::{DocumentRef, InputDescriptor, JobToBeDone, Persona};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub documents: Vec<DocumentRef>,
    pub persona: Persona,
    pub job_to_be_done: JobToBeDone,
    /// RFC 3339 time the report was assembled.
    pub processing_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub page: u32,
    pub section_title: String,
    /// 1-based.
    pub importance_rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub page: u32,
    pub refined_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub metadata: Metadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

/// Build the report, stamped with the current time.
pub fn assemble(input: &InputDescriptor, ranked: &RankedResult) -> Report {
    assemble_at(input, ranked, Utc::now())
}

pub fn assemble_at(input: &InputDescriptor, ranked: &RankedResult, at: DateTime<Utc>) -> Report {
    let extracted_sections = ranked
        .top_sections
        .iter()
        .enumerate()
        .map(|(i, s)| ExtractedSection {
            document: s.section.document_id.clone(),
            page: s.section.heading.page,
            section_title: s.section.heading.text.clone(),
            importance_rank: i + 1,
        })
        .collect();

    let subsection_analysis = ranked
        .top_summaries
        .iter()
        .map(|s| SubsectionAnalysis {
            document: s.section.section.document_id.clone(),
            page: s.section.section.heading.page,
            refined_text: s.refined_text.clone(),
        })
        .collect();

    Report {
        metadata: Metadata {
            documents: input.documents.clone(),
            persona: input.persona.clone(),
            job_to_be_done: input.job_to_be_done.clone(),
            processing_timestamp: at.to_rfc3339(),
        },
        extracted_sections,
        subsection_analysis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsage_core::{Heading, HeadingLevel, ScoredSection, Section, SectionSummary};

    fn input() -> InputDescriptor {
        InputDescriptor {
            documents: vec![
                DocumentRef {
                    filename: "a.pdf".into(),
                    title: None,
                },
                DocumentRef {
                    filename: "b.pdf".into(),
                    title: Some("B".into()),
                },
            ],
            persona: Persona {
                role: "Investment Analyst".into(),
            },
            job_to_be_done: JobToBeDone {
                task: "Analyze revenue trends".into(),
            },
        }
    }

    fn scored(doc: &str, page: u32, title: &str, score: f64) -> ScoredSection {
        let heading = Heading {
            level: HeadingLevel::H2,
            text: title.into(),
            page,
        };
        ScoredSection::new(Section::new(doc, heading, "body"), score)
    }

    #[test]
    fn test_assemble_ranks_and_round_trip() {
        let top = vec![scored("b.pdf", 4, "Revenue", 0.8), scored("a.pdf", 2, "Markets", 0.6)];
        let ranked = RankedResult {
            top_summaries: vec![SectionSummary {
                section: top[0].clone(),
                refined_text: "Revenue grew.".into(),
            }],
            top_sections: top,
        };
        let report = assemble(&input(), &ranked);

        assert_eq!(report.extracted_sections[0].importance_rank, 1);
        assert_eq!(report.extracted_sections[1].importance_rank, 2);
        assert_eq!(report.extracted_sections[1].section_title, "Markets");
        assert_eq!(report.subsection_analysis.len(), 1);
        assert_eq!(report.subsection_analysis[0].page, 4);

        let json = serde_json::to_string_pretty(&report).unwrap();
        let back: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
        assert!(DateTime::parse_from_rfc3339(&back.metadata.processing_timestamp).is_ok());
    }

    #[test]
    fn test_output_field_names() {
        let report = assemble(&input(), &RankedResult::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["metadata"]["persona"]["role"], "Investment Analyst");
        assert_eq!(json["metadata"]["job_to_be_done"]["task"], "Analyze revenue trends");
        assert_eq!(json["metadata"]["documents"][1]["title"], "B");
        assert!(json["metadata"]["documents"][0].get("title").is_none());
        assert_eq!(json["extracted_sections"], serde_json::json!([]));
        assert_eq!(json["subsection_analysis"], serde_json::json!([]));
    }
}
