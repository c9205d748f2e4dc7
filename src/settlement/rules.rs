//! Settlement rules: per-leg grading and slip aggregation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Outcome, Selection, Sport};

/// Per-leg state. `Pending` moves to one of the other three and stays there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegGrade {
    Win,
    Loss,
    Push,
    Pending,
}

impl LegGrade {
    pub fn is_settled(&self) -> bool {
        !matches!(self, LegGrade::Pending)
    }
}

impl fmt::Display for LegGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegGrade::Win => write!(f, "WIN"),
            LegGrade::Loss => write!(f, "LOSS"),
            LegGrade::Push => write!(f, "PUSH"),
            LegGrade::Pending => write!(f, "PENDING"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlipStatus {
    Won,
    Lost,
    Push,
    Partial,
    Pending,
}

impl fmt::Display for SlipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlipStatus::Won => write!(f, "WON"),
            SlipStatus::Lost => write!(f, "LOST"),
            SlipStatus::Push => write!(f, "PUSH"),
            SlipStatus::Partial => write!(f, "PARTIAL"),
            SlipStatus::Pending => write!(f, "PENDING"),
        }
    }
}

/// Fixture state as reported by the score feed.
///
/// Only the listed words are recognised; anything else is kept verbatim in
/// `Other` and grades as pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FixtureStatus {
    Scheduled,
    InProgress,
    Finished,
    Cancelled,
    Postponed,
    Suspended,
    Other(String),
}

impl FixtureStatus {
    pub fn is_final(&self) -> bool {
        matches!(self, FixtureStatus::Finished)
    }

    /// Stake is returned for every leg on a void fixture
    pub fn is_void(&self) -> bool {
        matches!(
            self,
            FixtureStatus::Cancelled | FixtureStatus::Postponed | FixtureStatus::Suspended
        )
    }
}

impl From<String> for FixtureStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "finished" | "final" => FixtureStatus::Finished,
            "cancelled" => FixtureStatus::Cancelled,
            "postponed" => FixtureStatus::Postponed,
            "suspended" => FixtureStatus::Suspended,
            "inprogress" | "in_progress" | "live" => FixtureStatus::InProgress,
            "scheduled" => FixtureStatus::Scheduled,
            _ => FixtureStatus::Other(raw),
        }
    }
}

impl From<&str> for FixtureStatus {
    fn from(raw: &str) -> Self {
        FixtureStatus::from(raw.to_string())
    }
}

impl From<FixtureStatus> for String {
    fn from(status: FixtureStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for FixtureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureStatus::Scheduled => write!(f, "Scheduled"),
            FixtureStatus::InProgress => write!(f, "InProgress"),
            FixtureStatus::Finished => write!(f, "Finished"),
            FixtureStatus::Cancelled => write!(f, "Cancelled"),
            FixtureStatus::Postponed => write!(f, "Postponed"),
            FixtureStatus::Suspended => write!(f, "Suspended"),
            FixtureStatus::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// Score snapshot for one fixture, as supplied by the score collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub home_team: String,
    pub away_team: String,
    /// Final score including any overtime or extra time
    pub home_score: u32,
    pub away_score: u32,
    /// 90-minute score when the feed reports one separately
    #[serde(default)]
    pub regulation_score: Option<(u32, u32)>,
    pub status: FixtureStatus,
    #[serde(default)]
    pub sport: Sport,
}

impl ScoreRecord {
    pub fn finished(
        sport: Sport,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        home_score: u32,
        away_score: u32,
    ) -> Self {
        Self {
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_score,
            away_score,
            regulation_score: None,
            status: FixtureStatus::Finished,
            sport,
        }
    }

    pub fn with_regulation(mut self, home: u32, away: u32) -> Self {
        self.regulation_score = Some((home, away));
        self
    }

    pub fn with_status(mut self, status: FixtureStatus) -> Self {
        self.status = status;
        self
    }

    /// Same record seen from the other side
    pub fn flipped(&self) -> Self {
        Self {
            home_team: self.away_team.clone(),
            away_team: self.home_team.clone(),
            home_score: self.away_score,
            away_score: self.home_score,
            regulation_score: self.regulation_score.map(|(h, a)| (a, h)),
            status: self.status.clone(),
            sport: self.sport,
        }
    }

    /// Score that settles bets: 90 minutes for football, final otherwise
    pub fn settling_score(&self) -> (u32, u32) {
        match (self.sport, self.regulation_score) {
            (Sport::Soccer, Some(regulation)) => regulation,
            _ => (self.home_score, self.away_score),
        }
    }

    pub fn score_line(&self) -> String {
        let (home, away) = self.settling_score();
        format!("{}-{}", home, away)
    }
}

/// Grade one leg against the fixture's score record
pub fn grade_leg(leg: &Selection, record: &ScoreRecord) -> LegGrade {
    if record.status.is_void() {
        return LegGrade::Push;
    }
    if !record.status.is_final() {
        return LegGrade::Pending;
    }

    let (home, away) = record.settling_score();
    match leg.outcome {
        Outcome::Home | Outcome::Draw | Outcome::Away => {
            let actual = match home.cmp(&away) {
                std::cmp::Ordering::Greater => Outcome::Home,
                std::cmp::Ordering::Less => Outcome::Away,
                std::cmp::Ordering::Equal => Outcome::Draw,
            };
            if leg.outcome == actual {
                LegGrade::Win
            } else {
                LegGrade::Loss
            }
        }
        Outcome::Over | Outcome::Under => {
            let Some(line) = leg.line else {
                return LegGrade::Pending;
            };
            let total = f64::from(home + away);
            if (total - line).abs() < f64::EPSILON {
                LegGrade::Push
            } else if (total > line) == (leg.outcome == Outcome::Over) {
                LegGrade::Win
            } else {
                LegGrade::Loss
            }
        }
    }
}

/// Slip status derived from its legs' grades
pub fn aggregate(grades: &[LegGrade]) -> SlipStatus {
    if grades.is_empty() {
        return SlipStatus::Pending;
    }
    if grades.contains(&LegGrade::Loss) {
        return SlipStatus::Lost;
    }
    if grades.contains(&LegGrade::Pending) {
        return if grades.iter().any(LegGrade::is_settled) {
            SlipStatus::Partial
        } else {
            SlipStatus::Pending
        };
    }
    if grades.iter().all(|g| *g == LegGrade::Push) {
        SlipStatus::Push
    } else {
        SlipStatus::Won
    }
}
