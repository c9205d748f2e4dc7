//! CSV Persistence Module
//!
//! Appends value opportunities to a daily CSV file and suppresses duplicates
//! (same fixture, outcome and domestic odds), including rows already written
//! by an earlier run on the same day.

use anyhow::{Context, Result};
use chrono::Utc;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tokio::sync::RwLock as AsyncRwLock;
use tracing::{debug, info};

use crate::types::{FixtureKey, Outcome, Sport};
use crate::value::{OpportunityKey, ValueOpportunity};

/// Opportunity row for CSV storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityRecord {
    pub timestamp: i64,
    pub id: String,
    pub sport: Sport,
    pub league: String,
    pub home: String,
    pub away: String,
    pub reference_home: String,
    pub reference_away: String,
    pub outcome: Outcome,
    pub domestic_odds: f64,
    pub reference_odds: f64,
    pub true_probability: f64,
    pub expected_value: f64,
    pub kelly_fraction: f64,
    pub tax_free_stake_ceiling: u64,
}

impl OpportunityRecord {
    pub fn key(&self) -> OpportunityKey {
        OpportunityKey::new(
            &FixtureKey::new(&self.home, &self.away),
            self.outcome,
            self.domestic_odds,
        )
    }
}

impl From<&ValueOpportunity> for OpportunityRecord {
    fn from(opp: &ValueOpportunity) -> Self {
        Self {
            timestamp: opp.created_at.timestamp_millis(),
            id: opp.id.to_string(),
            sport: opp.sport,
            league: opp.league.clone(),
            home: opp.fixture.home.clone(),
            away: opp.fixture.away.clone(),
            reference_home: opp.reference_fixture.home.clone(),
            reference_away: opp.reference_fixture.away.clone(),
            outcome: opp.outcome,
            domestic_odds: opp.domestic_odds,
            reference_odds: opp.reference_odds,
            true_probability: opp.true_probability,
            expected_value: opp.expected_value,
            kelly_fraction: opp.kelly_fraction,
            tax_free_stake_ceiling: opp.tax_free_stake_ceiling,
        }
    }
}

pub struct OpportunityRecorder {
    path: PathBuf,
    writer: AsyncRwLock<csv::Writer<fs::File>>,
    seen: RwLock<HashSet<OpportunityKey>>,
}

impl OpportunityRecorder {
    /// Open today's opportunity file under `data_dir/opportunities`
    pub fn new(data_dir: &str) -> Result<Self> {
        let dir = PathBuf::from(data_dir).join("opportunities");
        fs::create_dir_all(&dir).context("Failed to create opportunities directory")?;

        let today = Utc::now().format("%Y-%m-%d");
        Self::open(&dir.join(format!("opportunities_{}.csv", today)))
    }

    pub fn open(path: &Path) -> Result<Self> {
        let existing = load_records(path)?;
        let seen: HashSet<OpportunityKey> = existing.iter().map(OpportunityRecord::key).collect();
        if !seen.is_empty() {
            info!(path = %path.display(), known = seen.len(), "Loaded recorded opportunities");
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer: AsyncRwLock::new(create_writer(path)?),
            seen: RwLock::new(seen),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an opportunity; returns false when it duplicates a recorded one
    pub async fn record(&self, opportunity: &ValueOpportunity) -> Result<bool> {
        let key = opportunity.key();
        let fresh = match self.seen.write() {
            Ok(mut seen) => seen.insert(key),
            Err(_) => true,
        };
        if !fresh {
            debug!(
                fixture = %opportunity.fixture,
                outcome = %opportunity.outcome,
                "Duplicate opportunity skipped"
            );
            return Ok(false);
        }

        let mut writer = self.writer.write().await;
        writer
            .serialize(OpportunityRecord::from(opportunity))
            .context("Failed to write opportunity record")?;
        writer.flush().context("Failed to flush opportunity writer")?;
        Ok(true)
    }

    /// Append every new opportunity; returns how many were written
    pub async fn record_all(&self, opportunities: &[ValueOpportunity]) -> Result<usize> {
        let mut written = 0;
        for opportunity in opportunities {
            if self.record(opportunity).await? {
                written += 1;
            }
        }
        Ok(written)
    }

    pub fn load_history(&self) -> Result<Vec<OpportunityRecord>> {
        load_records(&self.path)
    }
}

fn create_writer(path: &Path) -> Result<csv::Writer<fs::File>> {
    let file_has_data = path.exists() && fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("Failed to open CSV file")?;

    Ok(WriterBuilder::new()
        .has_headers(!file_has_data)
        .from_writer(file))
}

fn load_records(path: &Path) -> Result<Vec<OpportunityRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = fs::File::open(path).context("Failed to open opportunity file")?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: OpportunityRecord = result.context("Failed to deserialize opportunity record")?;
        records.push(record);
    }
    records.sort_by_key(|r| r.timestamp);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn opportunity(odds: f64) -> ValueOpportunity {
        ValueOpportunity {
            id: Uuid::new_v4(),
            fixture: FixtureKey::new("맨시티", "리버풀"),
            reference_fixture: FixtureKey::new("Manchester City", "Liverpool"),
            sport: Sport::Soccer,
            league: "EPL".into(),
            outcome: Outcome::Home,
            domestic_odds: odds,
            reference_odds: 1.7,
            true_probability: 0.5586,
            expected_value: 0.5586 * odds,
            kelly_fraction: 0.02,
            tax_free_stake_ceiling: 100_000,
            created_at: Utc::now(),
        }
    }

    fn temp_file() -> PathBuf {
        std::env::temp_dir().join(format!("valuebet-opps-{}.csv", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn duplicates_are_skipped_across_reopen() {
        let path = temp_file();
        {
            let recorder = OpportunityRecorder::open(&path).unwrap();
            assert!(recorder.record(&opportunity(2.1)).await.unwrap());
            assert!(!recorder.record(&opportunity(2.1)).await.unwrap());
            assert!(recorder.record(&opportunity(2.2)).await.unwrap());
        }

        let reopened = OpportunityRecorder::open(&path).unwrap();
        assert_eq!(reopened.record_all(&[opportunity(2.1), opportunity(2.3)]).await.unwrap(), 1);

        let history = reopened.load_history().unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].home, "맨시티");
        assert_eq!(history[0].outcome, Outcome::Home);

        fs::remove_file(&path).ok();
    }
}
