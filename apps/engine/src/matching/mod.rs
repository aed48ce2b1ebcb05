//! The pure matching core: text normalization, vocabulary-based skill
//! extraction, the two match-score algorithms, job ranking, and the
//! cover-letter composer.
//!
//! Nothing in this module performs I/O. Record fetches and result writes
//! happen at the task-execution boundary in `worker`.

pub mod cover_letter;
pub mod extractor;
pub mod normalizer;
pub mod rank;
pub mod scorer;
pub mod vocabulary;

pub use cover_letter::compose;
pub use extractor::extract;
pub use normalizer::normalize;
pub use rank::{rank_jobs, RankedJob};
pub use scorer::{score_by_prose, score_by_tags, MatchResult, MatchScore};
