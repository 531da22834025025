//! Per-answer scoring.
//!
//! `score_answer` is the whole contract: one structured answer plus one
//! evaluation context plus one set of calibration params in, one score
//! record out. Pure and total — every malformed shape degrades to a defined
//! value, nothing errors, nothing is read from the environment.

use std::collections::BTreeSet;

use tracing::debug;

use brandlens_core::{AnswerBlock, EvaluationContext, ScoreBreakdown, ScoreFlag, ScoredAnswer};
use brandlens_rules::CompiledScoringParams;

use crate::matcher::{
    citation_matches_brand, domain_matches, domain_matches_brand, entity_matches_brand,
    normalize_domain,
};

/// Linear rank decay: rank 1 scores `base`, each further rank loses `step`,
/// floored at 0. An absent rank scores 0.
fn rank_score(rank: Option<u32>, params: &CompiledScoringParams) -> f64 {
    match rank {
        Some(r) => {
            let steps = r.saturating_sub(1) as f64;
            (params.rank_decay.base - steps * params.rank_decay.step).max(0.0)
        }
        None => 0.0,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Score one captured answer against the brand context.
pub fn score_answer(
    answer: &AnswerBlock,
    ctx: &EvaluationContext,
    params: &CompiledScoringParams,
) -> ScoredAnswer {
    // First brand-matching entity in array order. The entity's declared
    // position is the reported rank; the array index is the fallback.
    let mut llm_rank = None;
    for (idx, entity) in answer.ordered_entities.iter().enumerate() {
        if entity_matches_brand(entity, ctx) {
            llm_rank = Some(entity.position.unwrap_or(idx as u32 + 1));
            break;
        }
    }

    // First brand-matching citation; appearance order is rank.
    let link_rank = answer
        .citations
        .iter()
        .position(|c| citation_matches_brand(c, ctx))
        .map(|idx| idx as u32 + 1);

    let presence = llm_rank.is_some() || link_rank.is_some();

    // Share of voice over distinct normalized entity domains. Entities
    // without a domain are not part of the set.
    let mut distinct_domains: BTreeSet<String> = BTreeSet::new();
    for entity in &answer.ordered_entities {
        if let Some(domain) = entity.domain.as_deref() {
            let normalized = normalize_domain(domain);
            if !normalized.is_empty() {
                distinct_domains.insert(normalized);
            }
        }
    }
    let brand_owned = distinct_domains
        .iter()
        .filter(|d| domain_matches_brand(d, ctx))
        .count();
    let sov = if distinct_domains.is_empty() {
        0.0
    } else {
        brand_owned as f64 / distinct_domains.len() as f64
    };

    let severity_hits = answer
        .flags
        .iter()
        .filter(|flag| params.accuracy.severity_flags.iter().any(|s| s == *flag))
        .count();

    let breakdown = ScoreBreakdown {
        position: rank_score(llm_rank, params),
        link: rank_score(link_rank, params),
        sov: (sov * 100.0).round().clamp(0.0, 100.0),
        accuracy: (100.0 - severity_hits as f64 * params.accuracy.per_flag).max(0.0),
    };

    let score = round1(
        (breakdown.position + breakdown.link + breakdown.sov + breakdown.accuracy) / 4.0,
    );

    let mut flags = Vec::new();
    if !presence {
        flags.push(ScoreFlag::BrandAbsent);
    }
    if answer.ordered_entities.is_empty() {
        flags.push(ScoreFlag::NoEntities);
    }

    let competitors_seen = competitors_seen(answer, ctx);

    debug!(
        presence,
        ?llm_rank,
        ?link_rank,
        sov,
        score,
        "answer scored"
    );

    ScoredAnswer {
        presence,
        llm_rank,
        link_rank,
        sov,
        breakdown,
        score,
        flags,
        competitors_seen,
    }
}

/// Distinct configured competitor domains observed anywhere in the answer.
/// Reporting only — none of this feeds brand detection.
fn competitors_seen(answer: &AnswerBlock, ctx: &EvaluationContext) -> Vec<String> {
    let mut seen = BTreeSet::new();
    for competitor in &ctx.competitors {
        let normalized = normalize_domain(competitor);
        if normalized.is_empty() {
            continue;
        }
        let single = [normalized.clone()];
        let in_entities = answer.ordered_entities.iter().any(|e| {
            e.domain
                .as_deref()
                .is_some_and(|d| domain_matches(d, &single))
        });
        let in_citations = answer.citations.iter().any(|c| {
            let target = c.domain.as_deref().filter(|d| !d.trim().is_empty());
            domain_matches(target.unwrap_or(&c.url), &single)
        });
        if in_entities || in_citations {
            seen.insert(normalized);
        }
    }
    seen.into_iter().collect()
}
