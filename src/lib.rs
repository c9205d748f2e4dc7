//! valuebet Library
//!
//! Odds reconciliation and value/tax decision engine: pairs domestic and
//! reference odds, finds value prices, allocates slips around the tax rules
//! and grades settled slips.

pub mod allocator;
pub mod config;
pub mod error;
pub mod persistence;
pub mod reconcile;
pub mod settlement;
pub mod types;
pub mod value;

pub use allocator::{ComboResult, SlipOptimizer, StakePlan};
pub use error::EngineError;
pub use reconcile::{MatchTier, MatchedFixture, Reconciler, TeamDictionary};
pub use settlement::{Grader, LegGrade, ScoreRecord, ScoreSource, SlipStatus};
pub use types::{FixtureKey, MarketType, OddsQuote, Outcome, Selection, Slip, Sport};
pub use value::{true_probabilities, ValueDetector, ValueOpportunity};
