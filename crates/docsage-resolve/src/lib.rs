//! Relevance: persona keyword models, section scoring and ranking.
//!
//! The keyword model is built once per run and shared read-only by the
//! scorer. Scores depend only on the section and the model.

pub mod keywords;
pub mod ranker;
pub mod scorer;
pub mod types;

pub use keywords::KeywordModelBuilder;
pub use ranker::SectionRanker;
pub use scorer::RelevanceScorer;
pub use types::*;
