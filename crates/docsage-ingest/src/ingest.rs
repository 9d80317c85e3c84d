//! Document ingestion: file → fragments → sections.

use std::collections::HashSet;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use docsage_core::{Error, Outline, Result, Section};

use crate::loader::{DocumentLoader, LoadedDocument};
use crate::outline::HeadingDetector;

/// Sections of one ingested document.
#[derive(Debug, Clone)]
pub struct IngestedDocument {
    pub title: Option<String>,
    pub content_hash: String,
    pub sections: Vec<Section>,
}

/// Loads documents and splits them into sections, skipping content that
/// was already ingested in this run.
pub struct Ingester<'a> {
    loader: &'a dyn DocumentLoader,
    detector: &'a HeadingDetector,
    seen: HashSet<String>,
}

impl<'a> Ingester<'a> {
    pub fn new(loader: &'a dyn DocumentLoader, detector: &'a HeadingDetector) -> Self {
        Self {
            loader,
            detector,
            seen: HashSet::new(),
        }
    }

    /// Ingest a file under the given document id.
    ///
    /// An empty document yields no sections. Content already seen in this
    /// run is reported as [`Error::DuplicateContent`].
    pub fn ingest_file(&mut self, path: &Path, document_id: &str) -> Result<IngestedDocument> {
        let doc = self.loader.load(path)?;
        let fallback = fallback_title(&doc, path);
        self.ingest_document(doc, document_id, &fallback)
    }

    /// Ingest an already-loaded document.
    pub fn ingest_document(
        &mut self,
        doc: LoadedDocument,
        document_id: &str,
        fallback_title: &str,
    ) -> Result<IngestedDocument> {
        if doc.is_empty() {
            debug!("No text extracted from {}", document_id);
            return Ok(IngestedDocument {
                title: doc.title,
                content_hash: String::new(),
                sections: Vec::new(),
            });
        }

        let hash = content_hash(&doc.plain_text());
        if !self.seen.insert(hash.clone()) {
            debug!("Duplicate content, skipping: {}", document_id);
            return Err(Error::DuplicateContent(hash));
        }

        let sections = self.detector.detect(&doc.fragments, document_id, fallback_title);
        info!(
            "Ingested {}: {} fragments, {} sections",
            document_id,
            doc.fragments.len(),
            sections.len()
        );

        Ok(IngestedDocument {
            title: doc.title,
            content_hash: hash,
            sections,
        })
    }

    /// Outline of a file, without dedup bookkeeping.
    pub fn outline_file(&self, path: &Path) -> Result<Outline> {
        let doc = self.loader.load(path)?;
        Ok(self.detector.outline(&doc.fragments, doc.title.as_deref()))
    }
}

/// Loader title when present, else the filename stem.
pub fn fallback_title(doc: &LoadedDocument, path: &Path) -> String {
    doc.title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        })
        .unwrap_or_default()
}

/// SHA-256 hex digest of document text.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsage_core::config::HeadingConfig;
    use crate::loader::FileLoader;

    fn detector() -> HeadingDetector {
        HeadingDetector::new(&HeadingConfig::default()).unwrap()
    }

    #[test]
    fn test_content_hash_stable() {
        let h1 = content_hash("hello world");
        let h2 = content_hash("hello world");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert_ne!(h1, content_hash("hello world!"));
    }

    #[test]
    fn test_ingest_markdown_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.md");
        std::fs::write(&path, "# Guide\nSome intro text.\n## Setup\nInstall the tool first.").unwrap();

        let loader = FileLoader::new();
        let detector = detector();
        let mut ingester = Ingester::new(&loader, &detector);
        let doc = ingester.ingest_file(&path, "guide.md").unwrap();
        assert_eq!(doc.title.as_deref(), Some("Guide"));
        let names: Vec<&str> = doc.sections.iter().map(|s| s.heading.text.as_str()).collect();
        assert_eq!(names, vec!["Guide", "Setup"]);
        assert!(doc.sections.iter().all(|s| s.document_id == "guide.md"));
    }

    #[test]
    fn test_duplicate_content_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "same words\nin both files").unwrap();
        std::fs::write(&b, "same words\nin both files").unwrap();

        let loader = FileLoader::new();
        let detector = detector();
        let mut ingester = Ingester::new(&loader, &detector);
        let first = ingester.ingest_file(&a, "a.txt").unwrap();
        assert_eq!(first.sections.len(), 1);
        assert_eq!(first.sections[0].heading.text, "a");
        assert!(matches!(
            ingester.ingest_file(&b, "b.txt"),
            Err(Error::DuplicateContent(_))
        ));
    }

    #[test]
    fn test_empty_document_has_no_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "\n\n").unwrap();

        let loader = FileLoader::new();
        let detector = detector();
        let mut ingester = Ingester::new(&loader, &detector);
        let doc = ingester.ingest_file(&path, "blank.txt").unwrap();
        assert!(doc.sections.is_empty());
        // Empty documents do not poison the dedup set.
        let again = ingester.ingest_file(&path, "blank.txt").unwrap();
        assert!(again.sections.is_empty());
    }

    #[test]
    fn test_outline_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.md");
        std::fs::write(&path, "# Paper\nBody.\n## Method\nMore body.").unwrap();

        let loader = FileLoader::new();
        let detector = detector();
        let ingester = Ingester::new(&loader, &detector);
        let outline = ingester.outline_file(&path).unwrap();
        assert_eq!(outline.title, "Paper");
        assert_eq!(outline.outline.len(), 2);
    }
}
