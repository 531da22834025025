use serde::{Deserialize, Serialize};

/// Component sub-scores, each in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub position: f64,
    pub link: f64,
    pub sov: f64,
    pub accuracy: f64,
}

/// Anomaly labels produced during scoring. Kept separate from the upstream
/// parser flags on [`crate::AnswerBlock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFlag {
    BrandAbsent,
    NoEntities,
}

impl std::fmt::Display for ScoreFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreFlag::BrandAbsent => write!(f, "brand_absent"),
            ScoreFlag::NoEntities => write!(f, "no_entities"),
        }
    }
}

/// Visibility evaluation of a single captured answer.
///
/// Immutable once computed: re-evaluation replaces the stored record, it
/// never patches one in place. Every field is a deterministic function of
/// the answer block, the evaluation context, and the scoring parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAnswer {
    /// Brand detected anywhere in the entities or citations.
    pub presence: bool,
    /// 1-based rank of the first brand-matching entity, if any.
    pub llm_rank: Option<u32>,
    /// 1-based appearance rank of the first brand-matching citation, if any.
    pub link_rank: Option<u32>,
    /// Share of voice: brand-owned fraction of distinct mentioned domains.
    pub sov: f64,
    pub breakdown: ScoreBreakdown,
    /// Composite in [0, 100]: unweighted mean of the four components.
    pub score: f64,
    pub flags: Vec<ScoreFlag>,
    /// Configured competitor domains observed in the answer. Reporting only.
    pub competitors_seen: Vec<String>,
}

/// Run-level rollup across every scored answer of one run.
///
/// Always recomputed in full from the current score set, never patched
/// incrementally, so replaced scores can never leave it drifted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateScore {
    /// Mean composite score; 0 for a run with no answers.
    pub overall_score: f64,
    /// Percentage of answers where the brand was present.
    pub visibility_pct: f64,
    /// Mean `llm_rank` over answers where it exists; 0 when none do.
    pub avg_llm_rank: f64,
    /// Mean `link_rank` over answers where it exists; 0 when none do.
    pub avg_link_rank: f64,
    /// Mean share of voice over answers where the brand was present; 0 when
    /// it never was.
    pub avg_sov: f64,
    /// Component-wise mean of every answer's breakdown.
    pub breakdown: ScoreBreakdown,
    /// Number of answers aggregated.
    pub answers: usize,
}
