//! TTL-bounded score cache owned by the grader
//!
//! Read-through: the grader populates it on a miss. Concurrent writers for
//! the same fixture converge on the last write.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::RwLock;
use tracing::debug;

use super::rules::ScoreRecord;
use crate::reconcile::{contains_either, normalize, pair_key};

#[derive(Debug, Clone)]
struct CachedScore {
    record: ScoreRecord,
    fetched_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ScoreCache {
    ttl: Duration,
    entries: RwLock<BTreeMap<String, CachedScore>>,
}

impl ScoreCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs.min((i64::MAX / 1_000) as u64) as i64),
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn insert(&self, record: ScoreRecord) {
        self.insert_at(record, Utc::now());
    }

    pub fn insert_at(&self, record: ScoreRecord, fetched_at: DateTime<Utc>) {
        let key = pair_key(&record.home_team, &record.away_team);
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, CachedScore { record, fetched_at });
        }
    }

    pub fn resolve(&self, home: &str, away: &str) -> Option<ScoreRecord> {
        self.resolve_at(home, away, Utc::now())
    }

    /// Look up a fixture, oriented to the requested home/away order.
    ///
    /// Tries the exact key, then the reversed key, then a fuzzy pass where
    /// both team names must be contained in the cached names.
    pub fn resolve_at(&self, home: &str, away: &str, now: DateTime<Utc>) -> Option<ScoreRecord> {
        let entries = self.entries.read().ok()?;
        let fresh = |entry: &&CachedScore| now - entry.fetched_at < self.ttl;

        if let Some(entry) = entries.get(&pair_key(home, away)).filter(fresh) {
            return Some(entry.record.clone());
        }
        if let Some(entry) = entries.get(&pair_key(away, home)).filter(fresh) {
            debug!(home, away, "Score found under reversed key");
            return Some(entry.record.flipped());
        }

        let (home_norm, away_norm) = (normalize(home), normalize(away));
        for entry in entries.values().filter(|e| fresh(e)) {
            let cached_home = normalize(&entry.record.home_team);
            let cached_away = normalize(&entry.record.away_team);
            if contains_either(&home_norm, &cached_home)
                && contains_either(&away_norm, &cached_away)
            {
                debug!(home, away, cached = %entry.record.home_team, "Score found by fuzzy match");
                return Some(entry.record.clone());
            }
            if contains_either(&home_norm, &cached_away)
                && contains_either(&away_norm, &cached_home)
            {
                debug!(
                    home,
                    away,
                    cached = %entry.record.home_team,
                    "Score found by fuzzy reversed match"
                );
                return Some(entry.record.flipped());
            }
        }
        None
    }

    /// Drop every entry
    pub fn invalidate(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        match self.entries.write() {
            Ok(mut entries) => {
                let before = entries.len();
                entries.retain(|_, entry| now - entry.fetched_at < self.ttl);
                before - entries.len()
            }
            Err(_) => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
