//! reeval-worker — applies a scoring calibration to a captured run snapshot.
//!
//! Reads a run snapshot JSON file (answers captured by the query pipeline),
//! rescores every answer with the selected rule document, replaces the
//! stored scores and the run aggregate in the file, and reports what
//! happened. No answer engine is queried at any point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use brandlens_core::config::load_dotenv;
use brandlens_core::EvaluationContext;
use brandlens_reeval::{JsonRunStore, ReevalDriver};
use brandlens_rules::ScoringRule;

// ── CLI ─────────────────────────────────────────────────────────────

/// Rescore a captured run snapshot in place.
#[derive(Parser, Debug)]
#[command(name = "reeval-worker", version, about)]
struct Cli {
    /// Path to the run snapshot JSON file (rewritten in place).
    #[arg(long, env = "BRANDLENS_RUN_FILE")]
    run_file: PathBuf,

    /// Scoring params YAML; the embedded default calibration when omitted.
    #[arg(long, env = "BRANDLENS_RULES")]
    rules: Option<PathBuf>,

    /// Maximum concurrent score writes.
    #[arg(long, env = "BRANDLENS_CONCURRENCY", default_value_t = 8)]
    concurrency: usize,

    /// Brand name of the property being measured.
    #[arg(long)]
    brand_name: String,

    /// Domain that counts as the brand (repeatable).
    #[arg(long = "brand-domain", required = true)]
    brand_domains: Vec<String>,

    /// Known competitor domain (repeatable, reporting only).
    #[arg(long = "competitor")]
    competitors: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let rule = match &cli.rules {
        Some(path) => ScoringRule::load(path)
            .with_context(|| format!("loading scoring rule from {}", path.display()))?,
        None => ScoringRule::default_rule(),
    };
    anyhow::ensure!(
        rule.metadata.enabled,
        "scoring rule '{}' is disabled",
        rule.metadata.id
    );

    let ctx = EvaluationContext {
        brand_name: cli.brand_name,
        brand_domains: cli.brand_domains,
        competitors: cli.competitors,
    };
    ctx.validate().context("evaluation context rejected")?;

    let store = JsonRunStore::open(&cli.run_file)
        .await
        .with_context(|| format!("opening run snapshot {}", cli.run_file.display()))?;
    let run_id = store.run_id().await;

    let driver = ReevalDriver::new(
        Arc::new(store),
        rule.compile(),
        format!("scoring-rule:{}", rule.metadata.id),
    )
    .with_concurrency(cli.concurrency);

    let report = driver.re_evaluate(run_id, &ctx).await?;

    info!(
        run_id = %report.run_id,
        rescored = report.rescored,
        failed_writes = report.failed_writes,
        overall = report.aggregate.overall_score,
        visibility_pct = report.aggregate.visibility_pct,
        "re-evaluation complete"
    );

    Ok(())
}
