//! Answer visibility scoring core.
//!
//! Evaluates answer-engine responses for brand visibility in three stages:
//!
//! - **matcher**: does a mentioned entity or citation belong to the brand?
//! - **scorer**: one answer + evaluation context → one score record.
//! - **aggregate**: all score records of a run → one visibility snapshot.
//!
//! Nothing in this crate touches the network, storage, or a clock. Identical
//! inputs produce identical outputs, which is what allows historical runs to
//! be rescored after a calibration change without re-querying any provider.

pub mod aggregate;
pub mod matcher;
pub mod scorer;

pub use aggregate::aggregate_scores;
pub use matcher::{
    citation_matches_brand, domain_matches, domain_matches_brand, entity_matches_brand,
    name_matches_brand, normalize_domain,
};
pub use scorer::score_answer;
