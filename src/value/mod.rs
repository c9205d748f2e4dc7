//! Probability Estimator and Value Detector
//!
//! Reference odds are de-vigged into a true probability distribution; each
//! domestic price is then scored by `EV = p_true × domestic_odds` and sized
//! with capped fractional Kelly.

pub mod detector;
pub mod kelly;
pub mod probability;

pub use detector::{OpportunityKey, OutcomeEvaluation, ValueDetector, ValueOpportunity};
pub use kelly::{compute_fractional_kelly, KellyQuote};
pub use probability::{
    implied_probability, is_valid_odds, true_probabilities, Confidence, TrueProbabilityDistribution,
};
