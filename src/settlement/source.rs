//! Score lookup collaborator

use anyhow::Result;
use async_trait::async_trait;

use super::rules::ScoreRecord;
use crate::reconcile::pair_key;

/// Fetches a fixture's score by team names. `Ok(None)` means "not found".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreSource: Send + Sync {
    async fn fetch(&self, home: &str, away: &str) -> Result<Option<ScoreRecord>>;
}

/// In-memory source over an already-fetched score sweep
#[derive(Debug, Clone, Default)]
pub struct StaticScores {
    records: Vec<ScoreRecord>,
}

impl StaticScores {
    pub fn new(records: Vec<ScoreRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }
}

#[async_trait]
impl ScoreSource for StaticScores {
    async fn fetch(&self, home: &str, away: &str) -> Result<Option<ScoreRecord>> {
        let wanted = pair_key(home, away);
        let reversed = pair_key(away, home);
        Ok(self.records.iter().find_map(|r| {
            let key = pair_key(&r.home_team, &r.away_team);
            if key == wanted {
                Some(r.clone())
            } else if key == reversed {
                Some(r.flipped())
            } else {
                None
            }
        }))
    }
}
