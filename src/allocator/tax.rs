//! Jurisdiction tax model
//!
//! Two independent triggers tax a winning purchase at a flat rate on profit:
//! 1. profit above `profit_threshold`
//! 2. combined odds above `odds_threshold` with a gross return at or above
//!    `return_threshold`
//!
//! Every purchase is assessed on its own; splitting a budget into several
//! purchases therefore changes the liability.

use serde::Serialize;
use std::fmt;

use crate::config::JurisdictionRules;

/// Absorbs float error in `stake * odds` before truncating to whole currency
const RETURN_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaxTrigger {
    ProfitThreshold,
    HighOdds,
}

impl fmt::Display for TaxTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxTrigger::ProfitThreshold => write!(f, "profit_threshold"),
            TaxTrigger::HighOdds => write!(f, "high_odds"),
        }
    }
}

/// Tax liability of one purchase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxAssessment {
    pub stake: u64,
    pub odds: f64,
    pub gross_return: u64,
    pub profit: u64,
    pub tax: u64,
    pub net_return: u64,
    pub trigger: Option<TaxTrigger>,
    pub reason: String,
}

impl TaxAssessment {
    pub fn is_taxed(&self) -> bool {
        self.trigger.is_some()
    }
}

impl JurisdictionRules {
    /// Round down to a multiple of the minimum bet unit
    pub fn floor_unit(&self, amount: u64) -> u64 {
        let unit = self.min_bet_unit.max(1);
        amount / unit * unit
    }

    /// Whole-currency payout of a winning purchase
    pub fn gross_return(&self, stake: u64, odds: f64) -> u64 {
        if !odds.is_finite() || odds <= 0.0 {
            return 0;
        }
        (stake as f64 * odds + RETURN_EPSILON).floor() as u64
    }

    pub fn assess(&self, stake: u64, odds: f64) -> TaxAssessment {
        let gross_return = self.gross_return(stake, odds);
        let profit = gross_return.saturating_sub(stake);

        let trigger = if profit > self.profit_threshold {
            Some(TaxTrigger::ProfitThreshold)
        } else if odds > self.odds_threshold && gross_return >= self.return_threshold {
            Some(TaxTrigger::HighOdds)
        } else {
            None
        };

        let tax = match trigger {
            Some(_) => (profit as f64 * self.tax_rate).round() as u64,
            None => 0,
        };

        let reason = match trigger {
            Some(TaxTrigger::ProfitThreshold) => format!(
                "profit {} exceeds {}; {:.0}% tax applies",
                profit,
                self.profit_threshold,
                self.tax_rate * 100.0
            ),
            Some(TaxTrigger::HighOdds) => format!(
                "odds {:.1} exceed {:.0} with return {} at or above {}; {:.0}% tax applies",
                odds,
                self.odds_threshold,
                gross_return,
                self.return_threshold,
                self.tax_rate * 100.0
            ),
            None => "no tax".to_string(),
        };

        TaxAssessment {
            stake,
            odds,
            gross_return,
            profit,
            tax,
            net_return: gross_return - tax,
            trigger,
            reason,
        }
    }

    /// Largest stake, a multiple of the bet unit and within the round
    /// ceiling, whose payout at `odds` triggers neither rule.
    ///
    /// Zero when no purchasable stake stays untaxed or the odds are unusable.
    pub fn tax_free_stake_ceiling(&self, odds: f64) -> u64 {
        if !odds.is_finite() || odds <= 1.0 {
            return 0;
        }
        let raw = if odds > self.odds_threshold {
            (self.return_threshold.saturating_sub(1)) as f64 / odds
        } else {
            self.profit_threshold as f64 / (odds - 1.0)
        };
        let capped = (raw.max(0.0) as u64).min(self.round_stake_ceiling);
        self.step_down_while_taxed(self.floor_unit(capped), odds, |a| a.is_taxed())
    }

    /// Chunk size for splitting `budget` at `odds` so each purchase stays
    /// under the profit threshold. Clamped to `[min_bet_unit, budget]`.
    pub fn chunk_stake(&self, odds: f64, budget: u64) -> u64 {
        let unit = self.min_bet_unit.max(1);
        if !odds.is_finite() || odds <= 1.0 {
            return budget;
        }
        let raw = (self.profit_threshold as f64 / (odds - 1.0)) as u64;
        let chunk = self.floor_unit(raw).clamp(unit, budget.max(unit));
        self.step_down_while_taxed(chunk, odds, |a| {
            a.trigger == Some(TaxTrigger::ProfitThreshold)
        })
        .max(unit)
    }

    fn step_down_while_taxed(
        &self,
        mut stake: u64,
        odds: f64,
        taxed: impl Fn(&TaxAssessment) -> bool,
    ) -> u64 {
        let unit = self.min_bet_unit.max(1);
        while stake > 0 && taxed(&self.assess(stake, odds)) {
            stake = stake.saturating_sub(unit);
        }
        stake
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> JurisdictionRules {
        JurisdictionRules::default()
    }

    #[test]
    fn below_both_thresholds_is_untaxed() {
        let a = rules().assess(50_000, 20.0);
        assert_eq!(a.gross_return, 1_000_000);
        assert_eq!(a.tax, 0);
        assert_eq!(a.net_return, 1_000_000);
        assert!(!a.is_taxed());
    }

    #[test]
    fn profit_one_over_threshold_is_taxed() {
        let a = rules().assess(2_000_001, 2.0);
        assert_eq!(a.profit, 2_000_001);
        assert_eq!(a.trigger, Some(TaxTrigger::ProfitThreshold));
        assert_eq!(a.tax, (2_000_001f64 * 0.22).round() as u64);
        assert_eq!(a.net_return, a.gross_return - a.tax);
    }

    #[test]
    fn profit_at_threshold_is_untaxed() {
        let a = rules().assess(2_000_000, 2.0);
        assert_eq!(a.profit, 2_000_000);
        assert_eq!(a.tax, 0);
    }

    #[test]
    fn high_odds_rule_needs_return_threshold() {
        let r = rules();
        let small = r.assess(500, 150.0);
        assert_eq!(small.gross_return, 75_000);
        assert!(!small.is_taxed());

        let large = r.assess(1_000, 150.0);
        assert_eq!(large.gross_return, 150_000);
        assert_eq!(large.trigger, Some(TaxTrigger::HighOdds));
        assert_eq!(large.tax, (149_000f64 * 0.22).round() as u64);
        assert!(large.reason.contains("150.0"));
    }

    #[test]
    fn twenty_five_fold_full_budget_is_taxed() {
        let a = rules().assess(100_000, 25.0);
        assert_eq!(a.gross_return, 2_500_000);
        assert_eq!(a.tax, 528_000);
        assert_eq!(a.net_return, 1_972_000);
    }

    #[test]
    fn chunk_stake_stays_under_profit_threshold() {
        let r = rules();
        let chunk = r.chunk_stake(25.0, 100_000);
        assert_eq!(chunk, 83_300);
        assert!(!r.assess(chunk, 25.0).is_taxed());
        assert_eq!(r.chunk_stake(1.5, 100_000), 100_000);
    }

    #[test]
    fn tax_free_ceiling_by_odds_band() {
        let r = rules();
        assert_eq!(r.tax_free_stake_ceiling(1.8), 100_000);
        assert_eq!(r.tax_free_stake_ceiling(25.0), 83_300);
        // 99,999 / 150 = 666.66 -> 600
        assert_eq!(r.tax_free_stake_ceiling(150.0), 600);
        assert_eq!(r.tax_free_stake_ceiling(1.0), 0);
        assert_eq!(r.tax_free_stake_ceiling(f64::NAN), 0);
    }

    #[test]
    fn rules_are_data_not_constants() {
        let r = JurisdictionRules {
            profit_threshold: 50_000,
            tax_rate: 0.1,
            ..JurisdictionRules::default()
        };
        let a = r.assess(10_000, 7.0);
        assert_eq!(a.profit, 60_000);
        assert_eq!(a.tax, 6_000);
    }
}
