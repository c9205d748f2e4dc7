//! Tax-Aware Allocator
//!
//! Validates a multi-leg slip, caps the budget at the per-round ceiling and
//! searches a small set of stake plans for the one with the lowest tax:
//! - the whole budget on one purchase
//! - the budget split into sequential chunks that each stay under the
//!   profit threshold
//! - the leg list split into two halves, each bought with half the budget
//!
//! The search is a heuristic. It never fails on a legal slip; it returns
//! the cheapest candidate it found. A candidate that stakes less than the
//! single purchase must not lower the net return.

pub mod tax;
pub mod validation;

pub use tax::{TaxAssessment, TaxTrigger};
pub use validation::{validate, SlipViolation};

use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use crate::config::JurisdictionRules;
use crate::error::EngineError;
use crate::types::{combined_odds, Outcome, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlanStrategy {
    /// Whole budget on the full slip
    Single,
    /// One of several sequential purchases of the full slip
    Chunk { index: usize, of: usize },
    /// Half of the leg list bought on its own
    LegSplit { group: char },
}

impl fmt::Display for PlanStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStrategy::Single => write!(f, "single combo"),
            PlanStrategy::Chunk { index, of } => write!(f, "chunk {}/{}", index, of),
            PlanStrategy::LegSplit { group } => write!(f, "leg split {}", group),
        }
    }
}

/// One purchase in an execution plan
#[derive(Debug, Clone, Serialize)]
pub struct StakePlan {
    pub legs: Vec<Selection>,
    pub stake: u64,
    pub combined_odds: f64,
    pub gross_return: u64,
    pub tax: u64,
    pub net_return: u64,
    pub trigger: Option<TaxTrigger>,
    pub strategy: PlanStrategy,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxStrategy {
    /// Tax of one single purchase of the stake the plan places
    pub baseline_tax: u64,
    pub optimized_tax: u64,
    pub tax_saved: u64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegProbability {
    pub fixture: String,
    pub outcome: Outcome,
    pub odds: f64,
    /// Bookmaker implied probability in percent, one decimal
    pub implied_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlipSummary {
    pub total_legs: usize,
    pub combined_odds: f64,
    /// Budget after the per-round cap and unit rounding
    pub budget: u64,
    pub total_stake: u64,
    /// Budget the chunk cap left unplaced
    pub unallocated_stake: u64,
    pub expected_return: u64,
    pub total_tax: u64,
    pub net_return: u64,
    pub roi_pct: f64,
    pub combo_count: usize,
    pub leg_probabilities: Vec<LegProbability>,
}

/// Allocator output. A slip that breaks a structural rule carries only
/// `validation_errors`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComboResult {
    pub combos: Vec<StakePlan>,
    pub validation_errors: Vec<String>,
    pub tax_strategy: Option<TaxStrategy>,
    pub summary: Option<SlipSummary>,
}

impl ComboResult {
    pub fn is_valid(&self) -> bool {
        self.validation_errors.is_empty()
    }

    pub fn total_tax(&self) -> u64 {
        self.combos.iter().map(|c| c.tax).sum()
    }

    pub fn net_return(&self) -> u64 {
        self.combos.iter().map(|c| c.net_return).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SlipOptimizer {
    rules: JurisdictionRules,
}

impl SlipOptimizer {
    pub fn new(rules: JurisdictionRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &JurisdictionRules {
        &self.rules
    }

    pub fn validate(&self, legs: &[Selection]) -> Vec<SlipViolation> {
        validate(legs, &self.rules)
    }

    /// Human-readable violations, empty when the slip is legal
    pub fn validate_slip(&self, legs: &[Selection]) -> Vec<String> {
        self.validate(legs).iter().map(ToString::to_string).collect()
    }

    pub fn optimize(&self, legs: &[Selection], budget: i64) -> Result<ComboResult, EngineError> {
        if budget <= 0 {
            return Err(EngineError::NonPositiveBudget(budget));
        }
        if legs.is_empty() {
            return Err(EngineError::EmptySlip);
        }

        let violations = self.validate_slip(legs);
        if !violations.is_empty() {
            debug!(errors = violations.len(), "Slip rejected by validation");
            return Ok(ComboResult {
                validation_errors: violations,
                ..ComboResult::default()
            });
        }

        let capped = self
            .rules
            .floor_unit((budget as u64).min(self.rules.round_stake_ceiling));
        if capped < self.rules.min_bet_unit.max(1) {
            return Err(EngineError::BudgetBelowMinimum {
                budget,
                min_unit: self.rules.min_bet_unit,
            });
        }

        let odds = combined_odds(legs);
        let single = self.plan(legs, capped, PlanStrategy::Single);
        let (single_tax, single_net) = (single.tax, single.net_return);
        let mut best = vec![single];

        if single_tax > 0 {
            let chunked = self.chunked(legs, odds, capped);
            if total_tax(&chunked) < single_tax && net_return(&chunked) >= single_net {
                best = chunked;
            } else {
                debug!(
                    chunks = chunked.len(),
                    tax = total_tax(&chunked),
                    net = net_return(&chunked),
                    "Chunked plan rejected"
                );
            }
        }

        if total_tax(&best) > 0 && legs.len() >= 2 * self.rules.min_legs {
            if let Some(split) = self.leg_split(legs, capped) {
                if total_tax(&split) < total_tax(&best) {
                    best = split;
                }
            }
        }

        let placed: u64 = best.iter().map(|p| p.stake).sum();
        let baseline_tax = self.rules.assess(placed, odds).tax;
        let optimized_tax = total_tax(&best);
        let tax_saved = baseline_tax.saturating_sub(optimized_tax);
        let tax_strategy = TaxStrategy {
            baseline_tax,
            optimized_tax,
            tax_saved,
            description: match best.first().map(|p| p.strategy) {
                Some(PlanStrategy::Chunk { .. }) if tax_saved > 0 => {
                    "split stake into chunks".into()
                }
                Some(PlanStrategy::LegSplit { .. }) => "split legs into two slips".into(),
                _ if baseline_tax == 0 => "no tax impact".into(),
                _ => "no cheaper plan found".into(),
            },
        };

        let summary = self.summarize(legs, odds, capped, &best);
        info!(
            legs = legs.len(),
            odds = %format!("{:.2}", odds),
            budget = capped,
            combos = best.len(),
            baseline_tax,
            optimized_tax,
            "Slip optimized"
        );

        Ok(ComboResult {
            combos: best,
            validation_errors: Vec::new(),
            tax_strategy: Some(tax_strategy),
            summary: Some(summary),
        })
    }

    fn plan(&self, legs: &[Selection], stake: u64, strategy: PlanStrategy) -> StakePlan {
        let odds = combined_odds(legs);
        let assessment = self.rules.assess(stake, odds);
        StakePlan {
            legs: legs.to_vec(),
            stake,
            combined_odds: odds,
            gross_return: assessment.gross_return,
            tax: assessment.tax,
            net_return: assessment.net_return,
            trigger: assessment.trigger,
            strategy,
        }
    }

    fn chunked(&self, legs: &[Selection], odds: f64, budget: u64) -> Vec<StakePlan> {
        let unit = self.rules.min_bet_unit.max(1);
        let chunk = self.rules.chunk_stake(odds, budget);

        let mut stakes = Vec::new();
        let mut remaining = budget;
        while remaining >= unit && stakes.len() < self.rules.max_chunks {
            let stake = chunk.min(remaining);
            stakes.push(stake);
            remaining -= stake;
        }

        let of = stakes.len();
        stakes
            .into_iter()
            .enumerate()
            .map(|(i, stake)| self.plan(legs, stake, PlanStrategy::Chunk { index: i + 1, of }))
            .collect()
    }

    fn leg_split(&self, legs: &[Selection], budget: u64) -> Option<Vec<StakePlan>> {
        let half = legs.len() / 2;
        let stake_a = self.rules.floor_unit(budget / 2);
        let stake_b = budget - stake_a;
        if stake_a < self.rules.min_bet_unit.max(1) {
            return None;
        }
        Some(vec![
            self.plan(&legs[..half], stake_a, PlanStrategy::LegSplit { group: 'A' }),
            self.plan(&legs[half..], stake_b, PlanStrategy::LegSplit { group: 'B' }),
        ])
    }

    fn summarize(
        &self,
        legs: &[Selection],
        odds: f64,
        budget: u64,
        plans: &[StakePlan],
    ) -> SlipSummary {
        let total_stake: u64 = plans.iter().map(|p| p.stake).sum();
        let expected_return: u64 = plans.iter().map(|p| p.gross_return).sum();
        let net_return: u64 = plans.iter().map(|p| p.net_return).sum();
        let roi_pct = if total_stake > 0 {
            round1((net_return as f64 / total_stake as f64 - 1.0) * 100.0)
        } else {
            0.0
        };

        SlipSummary {
            total_legs: legs.len(),
            combined_odds: odds,
            budget,
            total_stake,
            unallocated_stake: budget.saturating_sub(total_stake),
            expected_return,
            total_tax: total_tax(plans),
            net_return,
            roi_pct,
            combo_count: plans.len(),
            leg_probabilities: legs
                .iter()
                .map(|leg| LegProbability {
                    fixture: leg.fixture.to_string(),
                    outcome: leg.outcome,
                    odds: leg.odds,
                    implied_pct: if leg.odds > 0.0 { round1(100.0 / leg.odds) } else { 0.0 },
                })
                .collect(),
        }
    }
}

fn total_tax(plans: &[StakePlan]) -> u64 {
    plans.iter().map(|p| p.tax).sum()
}

fn net_return(plans: &[StakePlan]) -> u64 {
    plans.iter().map(|p| p.net_return).sum()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FixtureKey;

    fn leg(n: usize, odds: f64) -> Selection {
        Selection::outright(FixtureKey::new(format!("홈{n}"), format!("원정{n}")), Outcome::Home, odds)
    }

    fn optimizer() -> SlipOptimizer {
        SlipOptimizer::default()
    }

    #[test]
    fn untaxed_slip_is_one_combo() {
        let result = optimizer().optimize(&[leg(1, 1.8), leg(2, 2.0)], 10_000).unwrap();
        assert!(result.is_valid());
        assert_eq!(result.combos.len(), 1);
        assert_eq!(result.combos[0].strategy, PlanStrategy::Single);
        assert_eq!(result.combos[0].gross_return, 36_000);
        assert_eq!(result.total_tax(), 0);
        assert_eq!(result.tax_strategy.unwrap().tax_saved, 0);
    }

    #[test]
    fn chunking_beats_taxed_single_purchase() {
        let result = optimizer().optimize(&[leg(1, 5.0), leg(2, 5.0)], 100_000).unwrap();
        let stakes: Vec<u64> = result.combos.iter().map(|c| c.stake).collect();
        assert_eq!(stakes, vec![83_300, 16_700]);
        assert!(result.combos.iter().all(|c| c.stake <= 83_333));
        assert_eq!(result.total_tax(), 0);

        let summary = result.summary.unwrap();
        assert_eq!(summary.net_return, 2_500_000);
        assert!(summary.net_return > 1_972_000);
        assert_eq!(summary.unallocated_stake, 0);

        let strategy = result.tax_strategy.unwrap();
        assert_eq!(strategy.baseline_tax, 528_000);
        assert_eq!(strategy.tax_saved, 528_000);
    }

    #[test]
    fn leg_split_when_chunking_cannot_help() {
        let legs = vec![leg(1, 4.0), leg(2, 4.0), leg(3, 4.0), leg(4, 4.0)];
        let result = optimizer().optimize(&legs, 10_000).unwrap();
        assert_eq!(result.combos.len(), 2);
        assert_eq!(result.combos[0].strategy, PlanStrategy::LegSplit { group: 'A' });
        assert_eq!(result.combos[0].legs.len(), 2);
        assert_eq!(result.combos[0].stake, 5_000);
        assert_eq!(result.combos[1].stake, 5_000);
        assert_eq!(result.total_tax(), 0);
    }

    #[test]
    fn high_odds_slip_keeps_single_purchase() {
        let legs = vec![leg(1, 10.0), leg(2, 10.0), leg(3, 10.0)];
        let result = optimizer().optimize(&legs, 100_000).unwrap();
        assert_eq!(result.combos.len(), 1);
        assert_eq!(result.combos[0].strategy, PlanStrategy::Single);
        assert_eq!(result.net_return(), 78_022_000);

        let summary = result.summary.unwrap();
        assert_eq!(summary.total_stake, 100_000);
        assert_eq!(summary.unallocated_stake, 0);

        let strategy = result.tax_strategy.unwrap();
        assert_eq!(strategy.baseline_tax, 21_978_000);
        assert_eq!(strategy.optimized_tax, 21_978_000);
        assert_eq!(strategy.tax_saved, 0);
        assert_eq!(strategy.description, "no cheaper plan found");
    }

    #[test]
    fn budget_is_capped_per_round() {
        let result = optimizer().optimize(&[leg(1, 1.5), leg(2, 1.5)], 250_000).unwrap();
        assert_eq!(result.combos[0].stake, 100_000);
        assert_eq!(result.summary.unwrap().budget, 100_000);
    }

    #[test]
    fn invalid_slip_is_refused_with_all_errors() {
        let result = optimizer().optimize(&[leg(1, 1.0)], 10_000).unwrap();
        assert!(result.combos.is_empty());
        assert_eq!(result.validation_errors.len(), 2);
        assert!(result.summary.is_none());
    }

    #[test]
    fn misuse_is_an_error() {
        let legs = [leg(1, 1.8), leg(2, 2.0)];
        assert_eq!(optimizer().optimize(&legs, 0).unwrap_err(), EngineError::NonPositiveBudget(0));
        assert_eq!(
            optimizer().optimize(&legs, -5).unwrap_err(),
            EngineError::NonPositiveBudget(-5)
        );
        assert_eq!(
            optimizer().optimize(&legs, 50).unwrap_err(),
            EngineError::BudgetBelowMinimum { budget: 50, min_unit: 100 }
        );
        assert_eq!(optimizer().optimize(&[], 1_000).unwrap_err(), EngineError::EmptySlip);
    }

    #[test]
    fn summary_lists_leg_probabilities() {
        let result = optimizer().optimize(&[leg(1, 2.0), leg(2, 4.0)], 1_000).unwrap();
        let summary = result.summary.unwrap();
        let pct: Vec<f64> = summary.leg_probabilities.iter().map(|l| l.implied_pct).collect();
        assert_eq!(pct, vec![50.0, 25.0]);
        assert_eq!(summary.roi_pct, 700.0);
    }
}
