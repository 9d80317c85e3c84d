//! docsage core: document model, configuration and error types.

pub mod config;
pub mod error;
pub mod model;

pub use config::{AnalyzerConfig, DataPaths};
pub use error::{Error, Result};
pub use model::{
    Fragment, Heading, HeadingLevel, Outline, OutlineEntry, Position, RankedResult,
    ScoredSection, Section, SectionSummary,
};
