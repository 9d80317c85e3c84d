//! docsage Ingest: document loading, heading detection, text normalization
//! and section summaries.

pub mod ingest;
pub mod loader;
pub mod outline;
pub mod pdf;
pub mod summarize;
pub mod text;

pub use ingest::{content_hash, IngestedDocument, Ingester};
pub use loader::{DocumentLoader, FileLoader, FileType, LoadedDocument};
pub use outline::HeadingDetector;
pub use pdf::PdfLoader;
pub use summarize::Summarizer;
