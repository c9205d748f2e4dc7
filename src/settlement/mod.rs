//! Settlement Grader
//!
//! Grades each leg of a slip against the fixture's score and derives the
//! slip status from the leg grades. Scores are read through a TTL cache that
//! the grader owns; a missing score leaves the leg pending.

pub mod cache;
pub mod rules;
pub mod source;

pub use cache::ScoreCache;
pub use rules::{aggregate, grade_leg, FixtureStatus, LegGrade, ScoreRecord, SlipStatus};
pub use source::{ScoreSource, StaticScores};

#[cfg(test)]
pub use source::MockScoreSource;

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SettlementConfig;
use crate::types::{FixtureKey, Outcome, Selection, Slip};

#[derive(Debug, Clone, Serialize)]
pub struct LegResult {
    pub fixture: FixtureKey,
    pub outcome: Outcome,
    pub grade: LegGrade,
    /// Settling score, "home-away"
    pub score: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlipGrade {
    pub slip_id: String,
    pub status: SlipStatus,
    pub legs: Vec<LegResult>,
    pub settled: usize,
    pub total: usize,
}

/// Outcome counts of one grading pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettlementStats {
    pub checked: usize,
    /// Slips that reached WON, LOST or PUSH
    pub settled: usize,
    pub won: usize,
    pub lost: usize,
    pub push: usize,
    pub partial: usize,
    pub pending: usize,
}

impl SettlementStats {
    fn record(&mut self, status: SlipStatus) {
        self.checked += 1;
        match status {
            SlipStatus::Won => self.won += 1,
            SlipStatus::Lost => self.lost += 1,
            SlipStatus::Push => self.push += 1,
            SlipStatus::Partial => self.partial += 1,
            SlipStatus::Pending => self.pending += 1,
        }
        if matches!(status, SlipStatus::Won | SlipStatus::Lost | SlipStatus::Push) {
            self.settled += 1;
        }
    }
}

pub struct Grader<S: ScoreSource> {
    source: S,
    cache: ScoreCache,
}

impl<S: ScoreSource> Grader<S> {
    pub fn new(source: S, config: &SettlementConfig) -> Self {
        Self::with_cache(source, ScoreCache::new(config.cache_ttl_secs))
    }

    pub fn with_cache(source: S, cache: ScoreCache) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &ScoreCache {
        &self.cache
    }

    /// Seed the cache from a full score sweep
    pub fn warm(&self, records: impl IntoIterator<Item = ScoreRecord>) -> usize {
        let mut count = 0;
        for record in records {
            self.cache.insert(record);
            count += 1;
        }
        debug!(count, "Score cache warmed");
        count
    }

    /// Cached score for a fixture, fetching on a miss
    pub async fn lookup(&self, home: &str, away: &str) -> Option<ScoreRecord> {
        if let Some(record) = self.cache.resolve(home, away) {
            return Some(record);
        }

        match self.source.fetch(home, away).await {
            Ok(Some(record)) => {
                self.cache.insert(record.clone());
                self.cache.resolve(home, away).or(Some(record))
            }
            Ok(None) => {
                debug!(home, away, "No score available");
                None
            }
            Err(e) => {
                warn!(home, away, error = %e, "Score lookup failed");
                None
            }
        }
    }

    pub async fn grade_leg(&self, leg: &Selection) -> LegResult {
        let record = self.lookup(&leg.fixture.home, &leg.fixture.away).await;
        let grade = record
            .as_ref()
            .map(|r| grade_leg(leg, r))
            .unwrap_or(LegGrade::Pending);

        LegResult {
            fixture: leg.fixture.clone(),
            outcome: leg.outcome,
            grade,
            score: record.map(|r| r.score_line()),
        }
    }

    /// Grade every leg concurrently, then aggregate
    pub async fn grade_slip(&self, slip: &Slip) -> SlipGrade {
        let legs = join_all(slip.legs.iter().map(|leg| self.grade_leg(leg))).await;
        let grades: Vec<LegGrade> = legs.iter().map(|l| l.grade).collect();
        let status = aggregate(&grades);

        SlipGrade {
            slip_id: slip.id.clone(),
            status,
            settled: grades.iter().filter(|g| g.is_settled()).count(),
            total: grades.len(),
            legs,
        }
    }

    pub async fn grade_slips(&self, slips: &[Slip]) -> (Vec<SlipGrade>, SettlementStats) {
        let grades = join_all(slips.iter().map(|slip| self.grade_slip(slip))).await;

        let mut stats = SettlementStats::default();
        for grade in &grades {
            stats.record(grade.status);
        }

        info!(
            checked = stats.checked,
            settled = stats.settled,
            won = stats.won,
            lost = stats.lost,
            push = stats.push,
            partial = stats.partial,
            "Grading pass complete"
        );
        (grades, stats)
    }
}
