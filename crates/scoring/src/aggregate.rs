//! Run-level aggregation.

use tracing::debug;

use brandlens_core::{AggregateScore, ScoreBreakdown, ScoredAnswer};

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Roll a run's score records up into one visibility snapshot.
///
/// Order-invariant, and agnostic to when or by which engine version each
/// record was produced — a run rescored halfway through a calibration change
/// still aggregates without special cases. Empty input yields the defined
/// zero aggregate, never NaN.
pub fn aggregate_scores(scores: &[ScoredAnswer]) -> AggregateScore {
    if scores.is_empty() {
        return AggregateScore::default();
    }

    let total = scores.len();
    let present = scores.iter().filter(|s| s.presence).count();

    let llm_ranks: Vec<f64> = scores
        .iter()
        .filter_map(|s| s.llm_rank)
        .map(f64::from)
        .collect();
    let link_ranks: Vec<f64> = scores
        .iter()
        .filter_map(|s| s.link_rank)
        .map(f64::from)
        .collect();
    // Share of voice averages over answers where the brand appeared;
    // brand-absent answers are excluded from this mean.
    let present_sovs: Vec<f64> = scores
        .iter()
        .filter(|s| s.presence)
        .map(|s| s.sov)
        .collect();

    let breakdown = ScoreBreakdown {
        position: mean(scores.iter().map(|s| s.breakdown.position).sum(), total),
        link: mean(scores.iter().map(|s| s.breakdown.link).sum(), total),
        sov: mean(scores.iter().map(|s| s.breakdown.sov).sum(), total),
        accuracy: mean(scores.iter().map(|s| s.breakdown.accuracy).sum(), total),
    };

    let aggregate = AggregateScore {
        overall_score: mean(scores.iter().map(|s| s.score).sum(), total),
        visibility_pct: 100.0 * present as f64 / total as f64,
        avg_llm_rank: mean(llm_ranks.iter().sum(), llm_ranks.len()),
        avg_link_rank: mean(link_ranks.iter().sum(), link_ranks.len()),
        avg_sov: mean(present_sovs.iter().sum(), present_sovs.len()),
        breakdown,
        answers: total,
    };

    debug!(
        answers = total,
        overall = aggregate.overall_score,
        visibility_pct = aggregate.visibility_pct,
        "run aggregated"
    );

    aggregate
}
