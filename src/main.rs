//! valuebet - run one decision pass over an odds snapshot
//!
//! Usage: valuebet <snapshot.json>
//!
//! The snapshot holds domestic and reference quotes, plus optional slips to
//! allocate and score records to grade them against. The JSON report goes to
//! stdout; logs go to stderr.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use valuebet::allocator::{ComboResult, SlipOptimizer};
use valuebet::config::{AppConfig, LoggingConfig};
use valuebet::persistence::OpportunityRecorder;
use valuebet::reconcile::{MatchedFixture, Reconciler};
use valuebet::settlement::{Grader, ScoreRecord, SettlementStats, SlipGrade, StaticScores};
use valuebet::types::{OddsQuote, Selection, Slip};
use valuebet::value::{ValueDetector, ValueOpportunity};

#[derive(Debug, Deserialize)]
struct Snapshot {
    domestic: Vec<OddsQuote>,
    reference: Vec<OddsQuote>,
    #[serde(default)]
    slips: Vec<SlipRequest>,
    #[serde(default)]
    scores: Vec<ScoreRecord>,
}

#[derive(Debug, Deserialize)]
struct SlipRequest {
    id: String,
    legs: Vec<Selection>,
    /// Omit to grade only
    #[serde(default)]
    budget: Option<i64>,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    matched: &'a [MatchedFixture],
    domestic_only: usize,
    reference_only: usize,
    opportunities: &'a [ValueOpportunity],
    allocations: Vec<(String, ComboResult)>,
    grades: Vec<SlipGrade>,
    settlement: Option<SettlementStats>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging);
    info!(config = %config, "valuebet starting");

    let path = std::env::args()
        .nth(1)
        .context("usage: valuebet <snapshot.json>")?;
    let raw = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))?;
    let snapshot: Snapshot =
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path))?;

    let reconciler = Reconciler::from_config(&config.reconciler)?;
    let stats = reconciler.dictionary().stats();
    info!(
        pairs = stats.pairs,
        collisions = stats.collisions,
        "Team dictionary ready"
    );

    let reconciliation =
        reconciler.reconcile_with_leftovers(&snapshot.domestic, &snapshot.reference);

    let detector = ValueDetector::new(config.value.clone(), config.jurisdiction.clone());
    let opportunities = detector.find_value(&reconciliation.matched, config.value.ev_threshold);
    for opp in &opportunities {
        info!(
            fixture = %opp.fixture,
            outcome = %opp.outcome,
            odds = opp.domestic_odds,
            ev = %format!("{:.3}", opp.expected_value),
            kelly = %format!("{:.4}", opp.kelly_fraction),
            stake_ceiling = opp.tax_free_stake_ceiling,
            "Value opportunity"
        );
    }

    if config.persistence.csv_enabled && !opportunities.is_empty() {
        let recorder = OpportunityRecorder::new(&config.persistence.data_dir)?;
        let written = recorder.record_all(&opportunities).await?;
        info!(written, path = %recorder.path().display(), "Opportunities recorded");
    }

    let optimizer = SlipOptimizer::new(config.jurisdiction.clone());
    let mut allocations = Vec::new();
    for request in &snapshot.slips {
        let Some(budget) = request.budget else {
            continue;
        };
        match optimizer.optimize(&request.legs, budget) {
            Ok(result) => allocations.push((request.id.clone(), result)),
            Err(e) => warn!(slip = %request.id, error = %e, "Slip not optimized"),
        }
    }

    let (grades, settlement) = if snapshot.scores.is_empty() || snapshot.slips.is_empty() {
        (Vec::new(), None)
    } else {
        let grader = Grader::new(StaticScores::new(snapshot.scores.clone()), &config.settlement);
        grader.warm(snapshot.scores.iter().cloned());
        let slips: Vec<Slip> = snapshot
            .slips
            .iter()
            .map(|r| Slip::new(r.id.clone(), r.legs.clone()))
            .collect();
        let (grades, stats) = grader.grade_slips(&slips).await;
        (grades, Some(stats))
    };

    let report = Report {
        matched: &reconciliation.matched,
        domestic_only: reconciliation.domestic_only.len(),
        reference_only: reconciliation.reference_only.len(),
        opportunities: &opportunities,
        allocations,
        grades,
        settlement,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
