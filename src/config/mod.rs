//! Configuration management
//!
//! Loads from YAML files + environment variables via .env

mod types;

pub use types::*;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub value: ValueConfig,
    pub jurisdiction: JurisdictionRules,
    pub reconciler: ReconcilerConfig,
    pub settlement: SettlementConfig,
    pub persistence: PersistenceConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // Value defaults
            .set_default("value.ev_threshold", 1.05)?
            .set_default("value.kelly_fraction", 0.125)?
            .set_default("value.kelly_cap", 0.25)?
            // Jurisdiction defaults (domestic regulator)
            .set_default("jurisdiction.profit_threshold", 2_000_000)?
            .set_default("jurisdiction.odds_threshold", 100.0)?
            .set_default("jurisdiction.return_threshold", 100_000)?
            .set_default("jurisdiction.tax_rate", 0.22)?
            .set_default("jurisdiction.round_stake_ceiling", 100_000)?
            .set_default("jurisdiction.min_bet_unit", 100)?
            .set_default("jurisdiction.max_chunks", 5)?
            .set_default("jurisdiction.min_legs", 2)?
            .set_default("jurisdiction.max_legs", 10)?
            .set_default("jurisdiction.min_leg_odds", 1.01)?
            // Reconciler defaults
            .set_default("reconciler.max_kickoff_skew_mins", 360)?
            // Settlement defaults
            .set_default("settlement.cache_ttl_secs", 300)?
            // Persistence defaults
            .set_default("persistence.data_dir", "./data")?
            .set_default("persistence.csv_enabled", true)?
            // Logging defaults
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (VALUEBET_*)
            .add_source(Environment::with_prefix("VALUEBET").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(app_config)
    }

    /// Generate a digest of the config for logging
    pub fn digest(&self) -> String {
        format!(
            "ev_threshold={:.2} kelly={:.3}/cap={:.2} ceiling={} unit={} tax={:.0}% cache_ttl={}s",
            self.value.ev_threshold,
            self.value.kelly_fraction,
            self.value.kelly_cap,
            self.jurisdiction.round_stake_ceiling,
            self.jurisdiction.min_bet_unit,
            self.jurisdiction.tax_rate * 100.0,
            self.settlement.cache_ttl_secs
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
