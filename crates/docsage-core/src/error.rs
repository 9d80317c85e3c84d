//! Error types for docsage.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Document load error: {0}")]
    DocumentLoad(String),

    #[error("Duplicate content: hash={0}")]
    DuplicateContent(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input descriptor error: {0}")]
    Input(String),

    #[error("Output write error: {0}")]
    OutputWrite(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error must abort the whole run rather than a single document.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Input(_) | Self::OutputWrite(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
