//! Document loading: turn a file into an ordered list of text fragments.
//!
//! The PDF path goes through [`crate::pdf::PdfLoader`]. Fragment sidecar
//! JSON lets an external extractor feed the pipeline directly, and
//! markdown / plain text are handy for fixtures.

use docsage_core::{Error, Fragment, Result};
use serde::Deserialize;
use std::path::Path;

use crate::pdf::PdfLoader;

/// Synthetic font size for body lines of text-based formats.
pub const TEXT_BODY_SIZE: f32 = 11.0;

/// Vertical step between lines of text-based formats. Wider than the
/// heading merge gap at the largest markdown heading size.
const TEXT_LINE_PITCH: f32 = 40.0;

/// Fragments of one document plus its title, if the file carries one.
#[derive(Debug, Clone, Default)]
pub struct LoadedDocument {
    pub title: Option<String>,
    pub fragments: Vec<Fragment>,
}

impl LoadedDocument {
    pub fn is_empty(&self) -> bool {
        self.fragments.iter().all(|f| f.text.trim().is_empty())
    }

    /// Concatenated fragment text, used for content hashing.
    pub fn plain_text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Capability interface over whatever extracts text and layout.
pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<LoadedDocument>;
}

/// Supported file types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Fragments,
    Markdown,
    PlainText,
    Unknown,
}

impl FileType {
    /// Detect file type from extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "json" => Self::Fragments,
            "md" | "markdown" => Self::Markdown,
            "txt" | "text" => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Dispatches on file extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLoader;

impl FileLoader {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentLoader for FileLoader {
    fn load(&self, path: &Path) -> Result<LoadedDocument> {
        match FileType::from_path(path) {
            FileType::Pdf => PdfLoader::new().load(path),
            FileType::Fragments => load_fragments(path),
            FileType::Markdown => Ok(parse_markdown(&read_text(path)?)),
            FileType::PlainText => Ok(parse_plain_text(&read_text(path)?)),
            FileType::Unknown => Err(Error::DocumentLoad(format!(
                "unsupported file type: {}",
                path.display()
            ))),
        }
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::DocumentLoad(format!("{}: {}", path.display(), e)))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FragmentFile {
    Bare(Vec<Fragment>),
    Titled {
        #[serde(default)]
        title: Option<String>,
        fragments: Vec<Fragment>,
    },
}

/// Load a fragment sidecar: a bare array or `{title, fragments}`.
fn load_fragments(path: &Path) -> Result<LoadedDocument> {
    let raw = read_text(path)?;
    let parsed: FragmentFile = serde_json::from_str(&raw)
        .map_err(|e| Error::DocumentLoad(format!("{}: {}", path.display(), e)))?;
    Ok(match parsed {
        FragmentFile::Bare(fragments) => LoadedDocument {
            title: None,
            fragments,
        },
        FragmentFile::Titled { title, fragments } => LoadedDocument { title, fragments },
    })
}

/// `#`, `##`, `###` become bold headings at decreasing sizes; deeper
/// markers share the smallest heading size. A form feed starts a new page.
pub fn parse_markdown(text: &str) -> LoadedDocument {
    let mut fragments = Vec::new();
    let mut title = None;
    for (page, line, y) in lines_with_pages(text) {
        let hashes = line.chars().take_while(|&c| c == '#').count();
        let rest = line[hashes..].trim();
        if hashes > 0 && line[hashes..].starts_with(' ') && !rest.is_empty() {
            let size = match hashes {
                1 => 20.0,
                2 => 16.0,
                _ => 14.0,
            };
            if hashes == 1 && title.is_none() {
                title = Some(rest.to_string());
            }
            fragments.push(Fragment::new(rest, page, size, true).at(0.0, y));
        } else {
            let body = line.trim_start_matches(&['*', '-', '>'][..]).trim();
            if !body.is_empty() {
                fragments.push(Fragment::new(body, page, TEXT_BODY_SIZE, false).at(0.0, y));
            }
        }
    }
    LoadedDocument { title, fragments }
}

/// Every non-empty line becomes a body fragment.
pub fn parse_plain_text(text: &str) -> LoadedDocument {
    let fragments = lines_with_pages(text)
        .map(|(page, line, y)| Fragment::new(line, page, TEXT_BODY_SIZE, false).at(0.0, y))
        .collect();
    LoadedDocument {
        title: None,
        fragments,
    }
}

/// Non-empty trimmed lines with their 1-based page and a line offset
/// standing in for the vertical position.
fn lines_with_pages(text: &str) -> impl Iterator<Item = (u32, &str, f32)> {
    text.split('\u{c}').enumerate().flat_map(|(page_idx, page)| {
        page.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .enumerate()
            .map(move |(line_idx, line)| {
                (page_idx as u32 + 1, line, (line_idx + 1) as f32 * TEXT_LINE_PITCH)
            })
    })
}
