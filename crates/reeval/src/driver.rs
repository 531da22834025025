//! The re-evaluation driver.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use brandlens_core::{
    AggregateScore, AnswerId, BrandlensError, EvaluationContext, RunId, ScoredAnswer,
};
use brandlens_rules::CompiledScoringParams;
use brandlens_scoring::{aggregate_scores, score_answer};

use crate::store::{RunStore, StoreError, StoredScore};

const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum ReevalError {
    #[error("invalid evaluation context: {0}")]
    InvalidContext(#[from] BrandlensError),

    #[error("failed to load run: {0}")]
    Load(#[source] StoreError),

    #[error("failed to write aggregate: {0}")]
    AggregateWrite(#[source] StoreError),
}

/// Outcome of one re-evaluation pass over a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReevalReport {
    pub run_id: RunId,
    /// Scores recomputed — one per captured answer.
    pub rescored: usize,
    /// Score writes that failed and were skipped. The written aggregate
    /// still reflects every recomputed score, so a nonzero count means some
    /// stored per-answer scores lag behind it.
    pub failed_writes: usize,
    pub aggregate: AggregateScore,
}

/// Applies the current calibration to every captured answer of a run, then
/// replaces the run's aggregate. Never queries an answer engine.
pub struct ReevalDriver {
    store: Arc<dyn RunStore>,
    params: CompiledScoringParams,
    engine_version: String,
    concurrency: usize,
}

impl ReevalDriver {
    pub fn new(
        store: Arc<dyn RunStore>,
        params: CompiledScoringParams,
        engine_version: impl Into<String>,
    ) -> Self {
        Self {
            store,
            params,
            engine_version: engine_version.into(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Cap on concurrent score write-backs. Clamped to at least 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Rescore one run from its captured answers.
    ///
    /// Individual write failures are logged, counted, and skipped. The
    /// aggregate is recomputed from the complete fresh score set and written
    /// strictly after every per-answer write has been attempted; if that
    /// final write fails the whole pass errors, so a stale aggregate is
    /// never silently left looking current.
    pub async fn re_evaluate(
        &self,
        run_id: RunId,
        ctx: &EvaluationContext,
    ) -> Result<ReevalReport, ReevalError> {
        ctx.validate()?;

        let answers = self
            .store
            .load_answers(run_id)
            .await
            .map_err(ReevalError::Load)?;

        // Pure pass first: every answer scored before anything is written.
        let scored: Vec<(AnswerId, ScoredAnswer)> = answers
            .iter()
            .map(|a| (a.id, score_answer(&a.answer, ctx, &self.params)))
            .collect();

        let scored_at = Utc::now();
        let write_results: Vec<(AnswerId, Result<(), StoreError>)> =
            stream::iter(scored.iter().cloned().map(|(answer_id, value)| {
                let store = Arc::clone(&self.store);
                let engine_version = self.engine_version.clone();
                async move {
                    let result = store
                        .put_score(
                            run_id,
                            StoredScore {
                                answer_id,
                                value,
                                scored_at,
                                engine_version,
                            },
                        )
                        .await;
                    (answer_id, result)
                }
            }))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut failed_writes = 0;
        for (answer_id, result) in &write_results {
            if let Err(error) = result {
                warn!(%run_id, %answer_id, %error, "score write failed, continuing");
                failed_writes += 1;
            }
        }

        let values: Vec<ScoredAnswer> = scored.into_iter().map(|(_, v)| v).collect();
        let aggregate = aggregate_scores(&values);
        self.store
            .put_aggregate(run_id, aggregate.clone())
            .await
            .map_err(ReevalError::AggregateWrite)?;

        info!(
            %run_id,
            rescored = values.len(),
            failed_writes,
            overall = aggregate.overall_score,
            "run re-evaluated"
        );

        Ok(ReevalReport {
            run_id,
            rescored: values.len(),
            failed_writes,
            aggregate,
        })
    }
}
