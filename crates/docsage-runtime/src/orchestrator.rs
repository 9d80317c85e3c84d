//! Orchestrator: runs one analysis batch end to end.
//!
//! Per-document failures never abort a run: they are logged and recorded
//! in the [`RunSummary`]. Only reading the descriptor and writing the
//! report can fail a run.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use docsage_core::config::INPUT_FILE_NAME;
use docsage_core::{AnalyzerConfig, DataPaths, Error, Outline, Result};
use docsage_ingest::ingest::fallback_title;
use docsage_ingest::{DocumentLoader, FileLoader, FileType, HeadingDetector, Ingester, Summarizer};
use docsage_resolve::{KeywordModelBuilder, RelevanceScorer, SectionRanker};

use crate::report::assemble;
use crate::types::*;

/// Top-level orchestrator wiring the pipeline stages together.
pub struct Orchestrator {
    config: AnalyzerConfig,
    loader: Box<dyn DocumentLoader>,
    detector: HeadingDetector,
    keywords: KeywordModelBuilder,
    scorer: RelevanceScorer,
    ranker: SectionRanker,
    summarizer: Summarizer,
}

impl Orchestrator {
    /// Orchestrator reading documents from disk.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        Self::with_loader(config, Box::new(FileLoader::new()))
    }

    /// Orchestrator with an explicit loader (in-memory loaders in tests).
    pub fn with_loader(config: AnalyzerConfig, loader: Box<dyn DocumentLoader>) -> Result<Self> {
        config.validate()?;
        let detector = HeadingDetector::new(&config.heading)?;
        info!(
            "Orchestrator initialized: top_n={}, top_k={}, budget={}s",
            config.ranking.top_n, config.ranking.top_k, config.time_budget_secs
        );
        Ok(Self {
            detector,
            keywords: KeywordModelBuilder::new(config.keywords.clone()),
            scorer: RelevanceScorer::new(config.scoring.clone()),
            ranker: SectionRanker::new(&config.ranking),
            summarizer: Summarizer::new(config.summary.clone()),
            loader,
            config,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn detector(&self) -> &HeadingDetector {
        &self.detector
    }

    /// Analyze the documents named by `input`, resolved against `input_dir`.
    pub fn analyze(&self, input: &InputDescriptor, input_dir: &Path) -> Analysis {
        let started = Instant::now();
        let model = self
            .keywords
            .build(&input.persona.role, &input.job_to_be_done.task);
        let mut ingester = Ingester::new(self.loader.as_ref(), &self.detector);

        let mut scored = Vec::new();
        let mut summary = RunSummary::default();

        for doc in &input.documents {
            let path = input_dir.join(&doc.filename);
            let status = match self.loader.load(&path) {
                Err(e) => {
                    warn!("Skipping {}: {}", doc.filename, e);
                    DocumentStatus::Failed {
                        reason: e.to_string(),
                    }
                }
                Ok(loaded) => {
                    let title = doc
                        .title
                        .clone()
                        .filter(|t| !t.trim().is_empty())
                        .unwrap_or_else(|| fallback_title(&loaded, &path));
                    match ingester.ingest_document(loaded, &doc.filename, &title) {
                        Ok(ingested) if ingested.sections.is_empty() => {
                            warn!("No extractable text in {}", doc.filename);
                            DocumentStatus::Empty
                        }
                        Ok(ingested) => {
                            let count = ingested.sections.len();
                            scored.extend(
                                ingested
                                    .sections
                                    .into_iter()
                                    .map(|s| self.scorer.score_section(s, &model)),
                            );
                            DocumentStatus::Processed { sections: count }
                        }
                        Err(Error::DuplicateContent(hash)) => {
                            info!("{} duplicates earlier content ({}), skipping", doc.filename, hash);
                            DocumentStatus::Duplicate
                        }
                        Err(e) => {
                            warn!("Skipping {}: {}", doc.filename, e);
                            DocumentStatus::Failed {
                                reason: e.to_string(),
                            }
                        }
                    }
                }
            };
            debug!("{}: {:?}", doc.filename, status);
            summary.documents.push(DocumentOutcome {
                filename: doc.filename.clone(),
                status,
            });
        }

        summary.sections_scored = scored.len();
        let ranked = self
            .ranker
            .rank(scored, |s| self.summarizer.summarize(&s.section));
        let report = assemble(input, &ranked);

        let elapsed = started.elapsed();
        summary.elapsed_ms = elapsed.as_millis() as u64;
        let budget = Duration::from_secs(self.config.time_budget_secs);
        if elapsed > budget {
            summary.budget_exceeded = true;
            warn!(
                "Run took {:.1}s, over the {}s budget",
                elapsed.as_secs_f64(),
                self.config.time_budget_secs
            );
        }

        info!(
            "Analysis complete: {} documents ({} processed, {} failed), {} sections scored, {} ranked in {}ms",
            summary.documents.len(),
            summary.processed(),
            summary.failed(),
            summary.sections_scored,
            report.extracted_sections.len(),
            summary.elapsed_ms
        );

        Analysis { report, summary }
    }

    /// Read `input.json`, analyze, and write `output.json`.
    pub fn run(&self, paths: &DataPaths) -> Result<Analysis> {
        let raw = std::fs::read_to_string(&paths.input_file).map_err(|e| {
            Error::Input(format!("cannot read {}: {}", paths.input_file.display(), e))
        })?;
        let input: InputDescriptor = serde_json::from_str(&raw).map_err(|e| {
            Error::Input(format!("invalid descriptor {}: {}", paths.input_file.display(), e))
        })?;
        info!(
            "Processing {} documents for persona {:?}",
            input.documents.len(),
            input.persona.role
        );

        let analysis = self.analyze(&input, &paths.input_dir);
        write_json(&paths.output_file, &analysis.report)?;
        info!("Wrote {}", paths.output_file.display());
        Ok(analysis)
    }

    /// Write `<stem>.json` outlines for every supported file in `input_dir`.
    /// Documents that fail to load get an empty outline. The two directories
    /// must differ, otherwise outlines would overwrite fragment sidecars.
    pub fn outline_dir(&self, input_dir: &Path, output_dir: &Path) -> Result<usize> {
        std::fs::create_dir_all(output_dir).map_err(|e| {
            Error::OutputWrite(format!("cannot create {}: {}", output_dir.display(), e))
        })?;
        if same_dir(input_dir, output_dir) {
            return Err(Error::Config(format!(
                "output directory {} is the input directory",
                output_dir.display()
            )));
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(input_dir)
            .map_err(|e| Error::Input(format!("cannot list {}: {}", input_dir.display(), e)))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && FileType::from_path(p).is_supported())
            .filter(|p| p.file_name().and_then(|n| n.to_str()) != Some(INPUT_FILE_NAME))
            .collect();
        files.sort();

        let ingester = Ingester::new(self.loader.as_ref(), &self.detector);
        for path in &files {
            let outline = match ingester.outline_file(path) {
                Ok(outline) => outline,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Outline failed for {}: {}", path.display(), e);
                    Outline::default()
                }
            };
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("document");
            let target = output_dir.join(format!("{}.json", stem));
            write_json(&target, &outline)?;
            info!(
                "{} → {} ({} headings)",
                path.display(),
                target.display(),
                outline.outline.len()
            );
        }
        Ok(files.len())
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Error::OutputWrite(format!("{}: {}", path.display(), e)))?;
    std::fs::write(path, json)
        .map_err(|e| Error::OutputWrite(format!("{}: {}", path.display(), e)))
}
