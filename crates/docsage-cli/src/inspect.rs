//! `docsage inspect`: what the loader and heading detector see in one file.

use std::path::Path;

use anyhow::Context;

use docsage_core::{AnalyzerConfig, Fragment, HeadingLevel};
use docsage_ingest::ingest::fallback_title;
use docsage_ingest::outline::body_size;
use docsage_ingest::{DocumentLoader, FileLoader, HeadingDetector};

#[derive(Debug)]
pub struct SectionLine {
    pub level: HeadingLevel,
    pub title: String,
    pub page: u32,
    pub body_chars: usize,
}

#[derive(Debug)]
pub struct InspectReport {
    pub file: String,
    pub title: Option<String>,
    pub fragments: usize,
    pub pages: u32,
    pub body_size: f32,
    pub sections: Vec<SectionLine>,
}

pub fn inspect(path: &Path, config: &AnalyzerConfig) -> anyhow::Result<InspectReport> {
    let doc = FileLoader::new()
        .load(path)
        .with_context(|| format!("cannot load {}", path.display()))?;
    let detector = HeadingDetector::new(&config.heading)?;

    let usable: Vec<&Fragment> = doc.fragments.iter().filter(|f| f.is_well_formed()).collect();
    let file = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let sections = detector
        .detect(&doc.fragments, &file, &fallback_title(&doc, path))
        .into_iter()
        .map(|s| SectionLine {
            level: s.heading.level,
            body_chars: s.body_text.chars().count(),
            title: s.heading.text,
            page: s.heading.page,
        })
        .collect();

    Ok(InspectReport {
        pages: usable.iter().map(|f| f.page).max().unwrap_or(0),
        body_size: body_size(&usable),
        fragments: doc.fragments.len(),
        title: doc.title,
        file,
        sections,
    })
}

pub fn print_report(report: &InspectReport) {
    println!("=== {} ===", report.file);
    println!();
    println!("Title:       {}", report.title.as_deref().unwrap_or("(none)"));
    println!("Fragments:   {}", report.fragments);
    println!("Pages:       {}", report.pages);
    println!("Body size:   {:.1}pt", report.body_size);
    println!("Sections:    {}", report.sections.len());

    if !report.sections.is_empty() {
        println!();
        for s in &report.sections {
            let indent = "  ".repeat(s.level.depth());
            println!(
                "  {}{} {} (p.{}, {} chars)",
                indent, s.level, s.title, s.page, s.body_chars
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Notes\nFirst body line.\n\u{c}## Second\nMore body text.").unwrap();

        let report = inspect(&path, &AnalyzerConfig::default()).unwrap();
        assert_eq!(report.file, "notes.md");
        assert_eq!(report.title.as_deref(), Some("Notes"));
        assert_eq!(report.fragments, 4);
        assert_eq!(report.pages, 2);
        assert_eq!(report.body_size, 11.0);
        assert_eq!(report.sections.len(), 2);
        assert_eq!(report.sections[1].level, HeadingLevel::H2);
        assert_eq!(report.sections[1].page, 2);
    }

    #[test]
    fn test_inspect_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(inspect(&dir.path().join("gone.md"), &AnalyzerConfig::default()).is_err());
    }
}
