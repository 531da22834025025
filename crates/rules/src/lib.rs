//! Scoring calibration as data.
//!
//! The rank-decay slope, the accuracy penalty, and the set of upstream flags
//! that count as factual-unreliability signals are calibration values, not
//! code. They live in a YAML rule document so recalibration never requires a
//! code change, and are compiled into a flat params struct handed to the
//! scorer.

pub mod scoring_params;

pub use scoring_params::{
    AccuracyPenalty, CompiledScoringParams, RankDecay, RuleMetadata, RulesError, ScoringParamsSpec,
    ScoringRule,
};
