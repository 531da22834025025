/// Integration tests for the re-evaluation flow: driving a full run through
/// scoring and write-back against both stores, recalibrating a persisted
/// snapshot, and surviving per-answer write failures.
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use brandlens_core::{AnswerBlock, CapturedAnswer, Citation, EvaluationContext, RankedEntity, RunId};
use brandlens_reeval::{JsonRunStore, MemoryRunStore, ReevalDriver, RunSnapshot, RunStore};
use brandlens_rules::{RankDecay, ScoringRule};

// ============================================================================
// Test Helpers
// ============================================================================

fn make_ctx() -> EvaluationContext {
    EvaluationContext {
        brand_name: "Acme Apartments".to_string(),
        brand_domains: vec!["acme.com".to_string()],
        competitors: vec!["rival.com".to_string()],
    }
}

fn captured(run_id: RunId, engine: &str, entities: Vec<(&str, &str, u32)>) -> CapturedAnswer {
    CapturedAnswer {
        id: Uuid::new_v4(),
        run_id,
        engine: engine.to_string(),
        query: "best property managers in Austin".to_string(),
        captured_at: Utc::now(),
        answer: AnswerBlock {
            ordered_entities: entities
                .into_iter()
                .map(|(name, domain, position)| RankedEntity {
                    name: name.to_string(),
                    domain: Some(domain.to_string()),
                    rationale: None,
                    position: Some(position),
                })
                .collect(),
            citations: vec![Citation {
                url: "https://rival.com/roundup".to_string(),
                domain: None,
            }],
            answer_summary: String::new(),
            flags: Vec::new(),
        },
    }
}

fn make_answers(run_id: RunId) -> Vec<CapturedAnswer> {
    vec![
        captured(
            run_id,
            "chatgpt",
            vec![("Acme Apartments", "acme.com", 1), ("Rival PM", "rival.com", 2)],
        ),
        captured(
            run_id,
            "perplexity",
            vec![("Rival PM", "rival.com", 1), ("Acme Apartments", "acme.com", 3)],
        ),
        captured(run_id, "perplexity", vec![("Rival PM", "rival.com", 1)]),
    ]
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn full_reevaluation_over_memory_store() {
    let store = Arc::new(MemoryRunStore::new());
    let run_id = Uuid::new_v4();
    store.insert_run(run_id, make_answers(run_id)).await;

    let driver = ReevalDriver::new(
        store.clone(),
        ScoringRule::default_rule().compile(),
        "scoring-rule:scoring-default",
    )
    .with_concurrency(2);

    let report = driver.re_evaluate(run_id, &make_ctx()).await.unwrap();

    assert_eq!(report.rescored, 3);
    assert_eq!(report.failed_writes, 0);
    assert_eq!(report.aggregate.answers, 3);
    // Two of three answers surface the brand.
    assert!((report.aggregate.visibility_pct - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(report.aggregate.avg_llm_rank, 2.0);
    assert_eq!(store.score_count(run_id).await, 3);
}

#[tokio::test]
async fn reevaluation_is_idempotent_across_passes() {
    let store = Arc::new(MemoryRunStore::new());
    let run_id = Uuid::new_v4();
    let answers = make_answers(run_id);
    let first_id = answers[0].id;
    store.insert_run(run_id, answers).await;

    let driver = ReevalDriver::new(
        store.clone(),
        ScoringRule::default_rule().compile(),
        "scoring-rule:scoring-default",
    );

    let pass1 = driver.re_evaluate(run_id, &make_ctx()).await.unwrap();
    let score1 = store.score(run_id, first_id).await.unwrap();
    let pass2 = driver.re_evaluate(run_id, &make_ctx()).await.unwrap();
    let score2 = store.score(run_id, first_id).await.unwrap();

    // Same captured answers, same calibration: identical values, replaced
    // in place rather than accumulated.
    assert_eq!(pass1.aggregate, pass2.aggregate);
    assert_eq!(score1.value, score2.value);
    assert_eq!(store.score_count(run_id).await, 3);
}

#[tokio::test]
async fn failed_writes_reported_and_rest_of_batch_continues() {
    let store = Arc::new(MemoryRunStore::new());
    let run_id = Uuid::new_v4();
    let answers = make_answers(run_id);
    let failing_id = answers[1].id;
    store.insert_run(run_id, answers).await;
    store.fail_writes_for(failing_id).await;

    let driver = ReevalDriver::new(
        store.clone(),
        ScoringRule::default_rule().compile(),
        "scoring-rule:scoring-default",
    );
    let report = driver.re_evaluate(run_id, &make_ctx()).await.unwrap();

    assert_eq!(report.rescored, 3);
    assert_eq!(report.failed_writes, 1);
    assert_eq!(store.score_count(run_id).await, 2);
    assert!(store.score(run_id, failing_id).await.is_none());
    // The aggregate was still written over the complete recomputed set.
    assert_eq!(store.aggregate(run_id).await.unwrap().answers, 3);
}

#[tokio::test]
async fn json_snapshot_recalibration_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");

    let run_id = Uuid::new_v4();
    let snapshot = RunSnapshot {
        run_id,
        answers: make_answers(run_id),
        scores: Vec::new(),
        aggregate: None,
    };
    std::fs::write(&path, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();

    // First pass with the default calibration.
    let store = Arc::new(JsonRunStore::open(&path).await.unwrap());
    let driver = ReevalDriver::new(
        store,
        ScoringRule::default_rule().compile(),
        "scoring-rule:scoring-default",
    );
    let before = driver.re_evaluate(run_id, &make_ctx()).await.unwrap();

    let on_disk: RunSnapshot =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk.scores.len(), 3);
    assert_eq!(on_disk.aggregate.as_ref(), Some(&before.aggregate));
    assert!(on_disk
        .scores
        .iter()
        .all(|s| s.engine_version == "scoring-rule:scoring-default"));

    // Recalibrate: steeper decay, reopened from the rewritten file.
    let mut steep = ScoringRule::default_rule();
    steep.spec.rank_decay = RankDecay {
        base: 100.0,
        step: 30.0,
    };
    let store = Arc::new(JsonRunStore::open(&path).await.unwrap());
    let driver = ReevalDriver::new(store, steep.compile(), "scoring-rule:steep");
    let after = driver.re_evaluate(run_id, &make_ctx()).await.unwrap();

    // The captured answers are untouched; the scores moved.
    let on_disk: RunSnapshot =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk.answers, snapshot.answers);
    assert_eq!(on_disk.scores.len(), 3);
    assert!(on_disk.scores.iter().all(|s| s.engine_version == "scoring-rule:steep"));
    assert!(after.aggregate.overall_score < before.aggregate.overall_score);
}

#[tokio::test]
async fn json_store_rejects_foreign_run_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.json");

    let run_id = Uuid::new_v4();
    let snapshot = RunSnapshot {
        run_id,
        answers: Vec::new(),
        scores: Vec::new(),
        aggregate: None,
    };
    std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

    let store = JsonRunStore::open(&path).await.unwrap();
    assert_eq!(store.run_id().await, run_id);
    assert!(store.load_answers(Uuid::new_v4()).await.is_err());
}
