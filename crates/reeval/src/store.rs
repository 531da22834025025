//! Storage seam for runs, answers, and scores.
//!
//! The scoring core is pure; every suspension point of the subsystem lives
//! behind [`RunStore`]. Production backends belong to the platform's
//! persistence layer — this crate ships an in-memory store for tests and a
//! JSON snapshot store for the operator worker.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use brandlens_core::{AggregateScore, AnswerId, CapturedAnswer, RunId, ScoredAnswer};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("run not found: {0}")]
    RunNotFound(RunId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("backend error: {0}")]
    Backend(String),
}

/// A stored score: the deterministic value plus provenance.
///
/// `scored_at` and `engine_version` record when and with which calibration
/// the value was produced. They live outside the value itself so that
/// rescoring the same answer with the same calibration stays reproducible
/// bit for bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredScore {
    pub answer_id: AnswerId,
    pub value: ScoredAnswer,
    pub scored_at: DateTime<Utc>,
    pub engine_version: String,
}

/// Read/replace access to one run's captured answers, scores, and aggregate.
///
/// Scores and aggregates are replaced whole, never patched: the driver
/// recomputes everything it writes.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// All captured answers of a run.
    async fn load_answers(&self, run_id: RunId) -> Result<Vec<CapturedAnswer>, StoreError>;

    /// Replace the stored score for one answer.
    async fn put_score(&self, run_id: RunId, score: StoredScore) -> Result<(), StoreError>;

    /// Replace the stored aggregate for the run.
    async fn put_aggregate(
        &self,
        run_id: RunId,
        aggregate: AggregateScore,
    ) -> Result<(), StoreError>;
}

// ── In-memory store ─────────────────────────────────────────────────

#[derive(Default)]
struct MemoryInner {
    answers: HashMap<RunId, Vec<CapturedAnswer>>,
    scores: HashMap<RunId, HashMap<AnswerId, StoredScore>>,
    aggregates: HashMap<RunId, AggregateScore>,
    failing: HashSet<AnswerId>,
}

/// In-memory [`RunStore`] for tests. Score writes can be made to fail for
/// chosen answers to exercise partial-batch behavior.
#[derive(Default, Clone)]
pub struct MemoryRunStore {
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a run with captured answers.
    pub async fn insert_run(&self, run_id: RunId, answers: Vec<CapturedAnswer>) {
        self.inner.write().await.answers.insert(run_id, answers);
    }

    /// Make every future `put_score` for this answer fail.
    pub async fn fail_writes_for(&self, answer_id: AnswerId) {
        self.inner.write().await.failing.insert(answer_id);
    }

    pub async fn score(&self, run_id: RunId, answer_id: AnswerId) -> Option<StoredScore> {
        self.inner
            .read()
            .await
            .scores
            .get(&run_id)
            .and_then(|m| m.get(&answer_id))
            .cloned()
    }

    pub async fn score_count(&self, run_id: RunId) -> usize {
        self.inner
            .read()
            .await
            .scores
            .get(&run_id)
            .map_or(0, HashMap::len)
    }

    pub async fn aggregate(&self, run_id: RunId) -> Option<AggregateScore> {
        self.inner.read().await.aggregates.get(&run_id).cloned()
    }
}

#[async_trait]
impl RunStore for MemoryRunStore {
    async fn load_answers(&self, run_id: RunId) -> Result<Vec<CapturedAnswer>, StoreError> {
        self.inner
            .read()
            .await
            .answers
            .get(&run_id)
            .cloned()
            .ok_or(StoreError::RunNotFound(run_id))
    }

    async fn put_score(&self, run_id: RunId, score: StoredScore) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.failing.contains(&score.answer_id) {
            return Err(StoreError::Backend(format!(
                "injected write failure for {}",
                score.answer_id
            )));
        }
        inner
            .scores
            .entry(run_id)
            .or_default()
            .insert(score.answer_id, score);
        Ok(())
    }

    async fn put_aggregate(
        &self,
        run_id: RunId,
        aggregate: AggregateScore,
    ) -> Result<(), StoreError> {
        self.inner.write().await.aggregates.insert(run_id, aggregate);
        Ok(())
    }
}

// ── JSON snapshot store ─────────────────────────────────────────────

/// On-disk snapshot of one run: the capture pipeline's export plus whatever
/// scores and aggregate the last evaluation pass wrote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    pub run_id: RunId,
    #[serde(default)]
    pub answers: Vec<CapturedAnswer>,
    #[serde(default)]
    pub scores: Vec<StoredScore>,
    #[serde(default)]
    pub aggregate: Option<AggregateScore>,
}

/// [`RunStore`] backed by a single JSON snapshot file, rewritten in place
/// after every put. Backs the operator worker; a relational store plays this
/// role in the platform proper.
pub struct JsonRunStore {
    path: PathBuf,
    snapshot: RwLock<RunSnapshot>,
}

impl JsonRunStore {
    /// Read a snapshot file into memory.
    pub async fn open(path: &std::path::Path) -> Result<Self, StoreError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let snapshot: RunSnapshot = serde_json::from_str(&raw)?;
        debug!(
            path = %path.display(),
            run_id = %snapshot.run_id,
            answers = snapshot.answers.len(),
            "opened run snapshot"
        );
        Ok(Self {
            path: path.to_path_buf(),
            snapshot: RwLock::new(snapshot),
        })
    }

    /// The run this snapshot holds.
    pub async fn run_id(&self) -> RunId {
        self.snapshot.read().await.run_id
    }

    /// Write the snapshot out atomically: temp file in the same directory,
    /// then rename over the original.
    async fn persist(&self, snapshot: &RunSnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    fn check_run(snapshot: &RunSnapshot, run_id: RunId) -> Result<(), StoreError> {
        if snapshot.run_id != run_id {
            return Err(StoreError::RunNotFound(run_id));
        }
        Ok(())
    }
}

#[async_trait]
impl RunStore for JsonRunStore {
    async fn load_answers(&self, run_id: RunId) -> Result<Vec<CapturedAnswer>, StoreError> {
        let snapshot = self.snapshot.read().await;
        Self::check_run(&snapshot, run_id)?;
        Ok(snapshot.answers.clone())
    }

    async fn put_score(&self, run_id: RunId, score: StoredScore) -> Result<(), StoreError> {
        let mut snapshot = self.snapshot.write().await;
        Self::check_run(&snapshot, run_id)?;
        match snapshot
            .scores
            .iter_mut()
            .find(|s| s.answer_id == score.answer_id)
        {
            Some(existing) => *existing = score,
            None => snapshot.scores.push(score),
        }
        self.persist(&snapshot).await
    }

    async fn put_aggregate(
        &self,
        run_id: RunId,
        aggregate: AggregateScore,
    ) -> Result<(), StoreError> {
        let mut snapshot = self.snapshot.write().await;
        Self::check_run(&snapshot, run_id)?;
        snapshot.aggregate = Some(aggregate);
        self.persist(&snapshot).await
    }
}
