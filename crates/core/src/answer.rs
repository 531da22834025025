use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of one visibility run (a batch of test queries).
pub type RunId = Uuid;

/// Unique identifier of one captured answer within a run.
pub type AnswerId = Uuid;

/// One ranked recommendation inside an answer-engine response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntity {
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub rationale: Option<String>,
    /// 1-based rank as stated by the engine. Authoritative over the array
    /// index when the two disagree; the index is the fallback when absent.
    #[serde(default)]
    pub position: Option<u32>,
}

/// A supporting link the engine referenced. Order of appearance is rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub url: String,
    #[serde(default)]
    pub domain: Option<String>,
}

/// Structured answer as produced by the upstream capture pipeline.
///
/// The capture pipeline validates shape before anything lands here; the
/// scorer only degrades via documented fallbacks, it never probes fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnswerBlock {
    #[serde(default)]
    pub ordered_entities: Vec<RankedEntity>,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub answer_summary: String,
    /// Anomaly tags attached by the upstream parser ("empty_response",
    /// "malformed_json", ...). The scorer reads them only for the accuracy
    /// deduction and never emits them itself.
    #[serde(default)]
    pub flags: Vec<String>,
}

/// A captured answer as persisted by the query pipeline: the structured
/// block plus where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedAnswer {
    pub id: AnswerId,
    pub run_id: RunId,
    /// Answer engine that produced the response ("chatgpt", "perplexity", ...).
    pub engine: String,
    /// Test query that was issued.
    pub query: String,
    pub captured_at: DateTime<Utc>,
    pub answer: AnswerBlock,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_block_tolerates_sparse_payloads() {
        // Upstream parsers omit fields they could not fill.
        let json = r#"{
            "ordered_entities": [{"name": "Acme Apartments"}],
            "citations": [{"url": "https://acme.com/pricing"}]
        }"#;
        let block: AnswerBlock = serde_json::from_str(json).unwrap();

        assert_eq!(block.ordered_entities.len(), 1);
        assert!(block.ordered_entities[0].domain.is_none());
        assert!(block.ordered_entities[0].position.is_none());
        assert!(block.citations[0].domain.is_none());
        assert!(block.flags.is_empty());
        assert!(block.answer_summary.is_empty());
    }

    #[test]
    fn captured_answer_round_trip() {
        let captured = CapturedAnswer {
            id: Uuid::new_v4(),
            run_id: Uuid::new_v4(),
            engine: "perplexity".to_string(),
            query: "best property managers in Austin".to_string(),
            captured_at: Utc::now(),
            answer: AnswerBlock::default(),
        };

        let json = serde_json::to_string(&captured).unwrap();
        let back: CapturedAnswer = serde_json::from_str(&json).unwrap();
        assert_eq!(captured, back);
    }
}
