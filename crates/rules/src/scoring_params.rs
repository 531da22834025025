//! ScoringParams rule kind — rank decay slope, accuracy penalty, and the
//! upstream flags treated as factual-unreliability signals.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Error type for rule loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid rule: {0}")]
    Invalid(String),
}

// ── YAML-level types ────────────────────────────────────────────────

/// Rule document header shared by all rule kinds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Top-level ScoringParams rule document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringRule {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: RuleMetadata,
    pub spec: ScoringParamsSpec,
}

/// Specification section of a ScoringParams rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringParamsSpec {
    /// Linear decay applied to entity and citation ranks.
    #[serde(default)]
    pub rank_decay: RankDecay,
    /// Accuracy deduction per severity-flagged upstream anomaly.
    #[serde(default)]
    pub accuracy: AccuracyPenalty,
}

/// Linear rank decay: `max(0, base - (rank - 1) * step)`.
///
/// Rank 1 scores `base`; with the default step the component floors at 0
/// from rank 8 onward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RankDecay {
    pub base: f64,
    pub step: f64,
}

impl Default for RankDecay {
    fn default() -> Self {
        Self {
            base: 100.0,
            step: 15.0,
        }
    }
}

/// Accuracy penalty parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AccuracyPenalty {
    /// Points deducted from 100 per matching upstream flag, floored at 0.
    pub per_flag: f64,
    /// Upstream parser flags that indicate factual unreliability.
    pub severity_flags: Vec<String>,
}

impl Default for AccuracyPenalty {
    fn default() -> Self {
        Self {
            per_flag: 25.0,
            severity_flags: vec![
                "empty_response".to_string(),
                "malformed_json".to_string(),
                "hallucinated_claim".to_string(),
            ],
        }
    }
}

impl Default for ScoringParamsSpec {
    fn default() -> Self {
        Self {
            rank_decay: RankDecay::default(),
            accuracy: AccuracyPenalty::default(),
        }
    }
}

// ── Compiled (hot-path) types ───────────────────────────────────────

/// Pre-compiled scoring params — all fields are already typed, no lookup
/// needed. Kept as a separate name for consistency with the compiled pattern.
pub type CompiledScoringParams = ScoringParamsSpec;

impl ScoringRule {
    /// Parse the embedded default rule document.
    pub fn default_rule() -> ScoringRule {
        serde_yaml::from_str(include_str!("../data/scoring-params.yml"))
            .expect("embedded scoring-params.yml must parse")
    }

    /// Load and validate a rule document from a YAML file.
    pub fn load(path: &Path) -> Result<ScoringRule, RulesError> {
        let yaml = std::fs::read_to_string(path)?;
        let rule: ScoringRule = serde_yaml::from_str(&yaml)?;
        rule.validate()?;
        debug!(id = %rule.metadata.id, path = %path.display(), "loaded scoring rule");
        Ok(rule)
    }

    /// Reject documents that would miscalibrate the scorer.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.kind != "ScoringParams" {
            return Err(RulesError::Invalid(format!(
                "expected kind ScoringParams, got '{}'",
                self.kind
            )));
        }
        if self.spec.rank_decay.base <= 0.0 {
            return Err(RulesError::Invalid("rank_decay.base must be positive".into()));
        }
        if self.spec.rank_decay.step <= 0.0 {
            return Err(RulesError::Invalid("rank_decay.step must be positive".into()));
        }
        if self.spec.accuracy.per_flag < 0.0 {
            return Err(RulesError::Invalid("accuracy.per_flag must not be negative".into()));
        }
        Ok(())
    }

    /// Compile the YAML config (trivial — spec is already typed).
    pub fn compile(&self) -> CompiledScoringParams {
        self.spec.clone()
    }
}
