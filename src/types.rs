//! Core types used throughout the engine
//!
//! Defines odds snapshots, outcomes, selections and the identities shared by
//! the reconciler, the value detector, the allocator and the grader.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported sports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    Soccer,
    Baseball,
    Basketball,
    IceHockey,
    Other,
}

impl Default for Sport {
    fn default() -> Self {
        Sport::Soccer
    }
}

impl Sport {
    /// Detect the sport from a feed key or label (e.g. "soccer_epl", "축구", "NBA")
    pub fn detect(raw: &str) -> Self {
        let key = raw.trim().to_lowercase();
        if key.contains("soccer") || key.contains("football") || key.contains("축구") {
            Sport::Soccer
        } else if key.contains("baseball") || key.contains("mlb") || key.contains("야구") {
            Sport::Baseball
        } else if key.contains("basketball") || key.contains("nba") || key.contains("농구") {
            Sport::Basketball
        } else if key.contains("icehockey")
            || key.contains("ice hockey")
            || key.contains("nhl")
            || key.contains("하키")
        {
            Sport::IceHockey
        } else {
            Sport::Other
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sport::Soccer => write!(f, "soccer"),
            Sport::Baseball => write!(f, "baseball"),
            Sport::Basketball => write!(f, "basketball"),
            Sport::IceHockey => write!(f, "icehockey"),
            Sport::Other => write!(f, "other"),
        }
    }
}

/// Selectable outcome of a fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Outcome {
    Home,
    Draw,
    Away,
    Over,
    Under,
}

impl Outcome {
    /// Outright outcomes in display order
    pub const OUTRIGHT: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    /// Parse an outcome from English or Korean market vocabulary
    pub fn from_text(raw: &str) -> Option<Self> {
        let text = raw.trim().to_lowercase();
        match text.as_str() {
            "home" | "h" | "1" | "w" | "홈" | "승" => Some(Outcome::Home),
            "draw" | "d" | "x" | "무" | "무승부" => Some(Outcome::Draw),
            "away" | "a" | "2" | "l" | "원정" | "패" => Some(Outcome::Away),
            "over" | "o" | "오버" => Some(Outcome::Over),
            "under" | "u" | "언더" => Some(Outcome::Under),
            _ => None,
        }
    }

    /// Market type this outcome belongs to
    pub fn market_type(&self) -> MarketType {
        match self {
            Outcome::Home | Outcome::Draw | Outcome::Away => MarketType::Outright,
            Outcome::Over | Outcome::Under => MarketType::Totals,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Home => write!(f, "Home"),
            Outcome::Draw => write!(f, "Draw"),
            Outcome::Away => write!(f, "Away"),
            Outcome::Over => write!(f, "Over"),
            Outcome::Under => write!(f, "Under"),
        }
    }
}

/// Market a leg is placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketType {
    /// Win/draw/win (승무패)
    #[serde(alias = "h2h")]
    Outright,
    /// Under/over (언더오버)
    Totals,
}

impl Default for MarketType {
    fn default() -> Self {
        MarketType::Outright
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketType::Outright => write!(f, "outright"),
            MarketType::Totals => write!(f, "totals"),
        }
    }
}

/// Which market published a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    /// Domestic regulated market (Korean names, truncated)
    Domestic,
    /// International reference market (English names, low margin)
    Reference,
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Market::Domestic => write!(f, "domestic"),
            Market::Reference => write!(f, "reference"),
        }
    }
}

/// Odds snapshot for one fixture from one provider
///
/// Created per fetch cycle and never mutated; a newer quote for the same
/// fixture supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsQuote {
    pub provider: String,
    #[serde(default)]
    pub sport: Sport,
    #[serde(default)]
    pub league: String,
    pub home_name: String,
    pub away_name: String,
    pub home_odds: f64,
    /// Absent for 2-way markets
    #[serde(default)]
    pub draw_odds: Option<f64>,
    pub away_odds: f64,
    #[serde(default)]
    pub event_time: Option<DateTime<Utc>>,
}

impl OddsQuote {
    /// Decimal odds for an outright outcome, if offered
    pub fn odds_for(&self, outcome: Outcome) -> Option<f64> {
        match outcome {
            Outcome::Home => Some(self.home_odds),
            Outcome::Draw => self.draw_odds,
            Outcome::Away => Some(self.away_odds),
            Outcome::Over | Outcome::Under => None,
        }
    }

    /// Outcomes this quote prices
    pub fn outcomes(&self) -> Vec<Outcome> {
        Outcome::OUTRIGHT
            .into_iter()
            .filter(|o| self.odds_for(*o).is_some())
            .collect()
    }

    pub fn is_three_way(&self) -> bool {
        self.draw_odds.is_some()
    }

    pub fn fixture(&self) -> FixtureKey {
        FixtureKey::new(&self.home_name, &self.away_name)
    }
}

/// Identity of a fixture as written by one market
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FixtureKey {
    pub home: String,
    pub away: String,
}

impl FixtureKey {
    pub fn new(home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            away: away.into(),
        }
    }
}

impl fmt::Display for FixtureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.home, self.away)
    }
}

/// One leg of a slip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Stable fixture id; falls back to the fixture name when empty
    #[serde(default)]
    pub fixture_id: String,
    pub fixture: FixtureKey,
    pub outcome: Outcome,
    pub odds: f64,
    #[serde(default)]
    pub market_type: MarketType,
    /// Goal/point line for totals legs
    #[serde(default)]
    pub line: Option<f64>,
    #[serde(default)]
    pub sport: Sport,
    #[serde(default)]
    pub league: String,
}

impl Selection {
    pub fn outright(fixture: FixtureKey, outcome: Outcome, odds: f64) -> Self {
        Self {
            fixture_id: String::new(),
            fixture,
            outcome,
            odds,
            market_type: MarketType::Outright,
            line: None,
            sport: Sport::Soccer,
            league: String::new(),
        }
    }

    pub fn totals(fixture: FixtureKey, outcome: Outcome, line: f64, odds: f64) -> Self {
        Self {
            fixture_id: String::new(),
            fixture,
            outcome,
            odds,
            market_type: MarketType::Totals,
            line: Some(line),
            sport: Sport::Soccer,
            league: String::new(),
        }
    }

    pub fn with_id(mut self, fixture_id: impl Into<String>) -> Self {
        self.fixture_id = fixture_id.into();
        self
    }

    pub fn with_sport(mut self, sport: Sport) -> Self {
        self.sport = sport;
        self
    }

    /// Key used to detect legs on the same fixture
    pub fn fixture_ref(&self) -> String {
        if self.fixture_id.is_empty() {
            self.fixture.to_string()
        } else {
            self.fixture_id.clone()
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(
                f,
                "{} {} {} @ {:.2}",
                self.fixture, self.outcome, line, self.odds
            ),
            None => write!(f, "{} {} @ {:.2}", self.fixture, self.outcome, self.odds),
        }
    }
}

/// Multi-leg betting slip
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slip {
    pub id: String,
    pub legs: Vec<Selection>,
}

impl Slip {
    pub fn new(id: impl Into<String>, legs: Vec<Selection>) -> Self {
        Self {
            id: id.into(),
            legs,
        }
    }
}

/// Product of leg odds
pub fn combined_odds(legs: &[Selection]) -> f64 {
    legs.iter().map(|leg| leg.odds).product()
}
