//! Error types for caller misuse
//!
//! Expected "no data" conditions (unmatched fixtures, missing scores,
//! malformed odds) are not errors; they are encoded in return values.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("budget must be positive, got {0}")]
    NonPositiveBudget(i64),

    #[error("budget {budget} is below the minimum bet unit {min_unit}")]
    BudgetBelowMinimum { budget: i64, min_unit: u64 },

    #[error("selection list is empty")]
    EmptySlip,

    #[error("team mapping names must not be empty")]
    EmptyMappingName,
}
