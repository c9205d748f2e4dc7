//! Configuration section types
//!
//! Every section carries the same defaults as the loader so library callers
//! can build one without touching the filesystem.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ValueConfig {
    /// Minimum expected value (true probability × domestic odds) to emit an opportunity
    pub ev_threshold: f64,
    /// Fractional Kelly multiplier (0.125 = 1/8 Kelly)
    pub kelly_fraction: f64,
    /// Hard per-bet cap on the recommended bankroll fraction
    pub kelly_cap: f64,
}

impl Default for ValueConfig {
    fn default() -> Self {
        Self {
            ev_threshold: 1.05,
            kelly_fraction: 0.125,
            kelly_cap: 0.25,
        }
    }
}

/// Regulator rules for tax, stake limits and slip shape
#[derive(Debug, Clone, Deserialize)]
pub struct JurisdictionRules {
    /// Profit above this is taxed (rule 1)
    pub profit_threshold: u64,
    /// Rule 2 trigger: combined odds above this...
    pub odds_threshold: f64,
    /// ...together with a gross return at or above this
    pub return_threshold: u64,
    /// Flat rate applied to profit
    pub tax_rate: f64,
    /// Maximum stake per round
    pub round_stake_ceiling: u64,
    /// Smallest purchasable stake; every stake is a multiple of it
    pub min_bet_unit: u64,
    /// Maximum sequential purchases when splitting a budget
    pub max_chunks: usize,
    pub min_legs: usize,
    pub max_legs: usize,
    pub min_leg_odds: f64,
}

impl Default for JurisdictionRules {
    fn default() -> Self {
        Self {
            profit_threshold: 2_000_000,
            odds_threshold: 100.0,
            return_threshold: 100_000,
            tax_rate: 0.22,
            round_stake_ceiling: 100_000,
            min_bet_unit: 100,
            max_chunks: 5,
            min_legs: 2,
            max_legs: 10,
            min_leg_odds: 1.01,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReconcilerConfig {
    /// Optional YAML file with extra domestic/reference pairs
    #[serde(default)]
    pub mapping_file: Option<String>,
    /// Maximum kickoff difference between paired quotes, when both carry a time
    pub max_kickoff_skew_mins: i64,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            mapping_file: None,
            max_kickoff_skew_mins: 360,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SettlementConfig {
    /// Score cache TTL in seconds
    pub cache_ttl_secs: u64,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self { cache_ttl_secs: 300 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    /// Data directory
    pub data_dir: String,
    /// Enable CSV logging of opportunities
    pub csv_enabled: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            csv_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
