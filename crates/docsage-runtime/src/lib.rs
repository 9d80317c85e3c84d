//! Runtime: batch orchestration, report assembly and outline export.
//!
//! [`Orchestrator::run`] is the whole pipeline: read `input.json`, load and
//! split each document, score every section against the persona model,
//! rank globally, summarize the best sections and write `output.json`.

pub mod orchestrator;
pub mod report;
pub mod types;

pub use orchestrator::Orchestrator;
pub use report::{assemble, Report};
pub use types::*;
