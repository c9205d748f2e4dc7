use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::kelly::compute_fractional_kelly;
use super::probability::{is_valid_odds, true_probabilities};
use crate::config::{JurisdictionRules, ValueConfig};
use crate::reconcile::MatchedFixture;
use crate::types::{FixtureKey, OddsQuote, Outcome, Sport};

/// Pricing of one outcome on both markets, value or not
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeEvaluation {
    pub outcome: Outcome,
    pub domestic_odds: f64,
    pub reference_odds: f64,
    pub true_probability: f64,
    pub expected_value: f64,
    pub kelly_fraction: f64,
    /// Domestic odds as a percentage of reference odds
    pub efficiency_pct: f64,
}

/// A domestic price that beats the de-vigged reference price
#[derive(Debug, Clone, Serialize)]
pub struct ValueOpportunity {
    pub id: Uuid,
    pub fixture: FixtureKey,
    pub reference_fixture: FixtureKey,
    pub sport: Sport,
    pub league: String,
    pub outcome: Outcome,
    pub domestic_odds: f64,
    pub reference_odds: f64,
    pub true_probability: f64,
    pub expected_value: f64,
    pub kelly_fraction: f64,
    pub tax_free_stake_ceiling: u64,
    pub created_at: DateTime<Utc>,
}

impl ValueOpportunity {
    pub fn key(&self) -> OpportunityKey {
        OpportunityKey::new(&self.fixture, self.outcome, self.domestic_odds)
    }
}

/// Duplicate-suppression identity: fixture, outcome and odds to 1/1000
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpportunityKey {
    pub fixture: FixtureKey,
    pub outcome: Outcome,
    pub odds_milli: i64,
}

impl OpportunityKey {
    pub fn new(fixture: &FixtureKey, outcome: Outcome, odds: f64) -> Self {
        Self {
            fixture: fixture.clone(),
            outcome,
            odds_milli: (odds * 1000.0).round() as i64,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValueDetector {
    config: ValueConfig,
    rules: JurisdictionRules,
}

impl ValueDetector {
    pub fn new(config: ValueConfig, rules: JurisdictionRules) -> Self {
        Self { config, rules }
    }

    pub fn ev_threshold(&self) -> f64 {
        self.config.ev_threshold
    }

    /// Evaluate every outcome priced on both quotes.
    ///
    /// EV and Kelly are zero when either side's odds are unusable.
    pub fn evaluate(&self, domestic: &OddsQuote, reference: &OddsQuote) -> Vec<OutcomeEvaluation> {
        let dist = true_probabilities(reference);

        domestic
            .outcomes()
            .into_iter()
            .filter_map(|outcome| {
                let domestic_odds = domestic.odds_for(outcome)?;
                let reference_odds = reference.odds_for(outcome)?;
                let true_probability = dist.get(outcome)?;

                let priced = is_valid_odds(domestic_odds) && !dist.is_low_confidence();
                let (expected_value, kelly_fraction) = if priced {
                    let kelly = compute_fractional_kelly(
                        true_probability,
                        domestic_odds,
                        self.config.kelly_fraction,
                        self.config.kelly_cap,
                    );
                    (true_probability * domestic_odds, kelly.f_capped)
                } else {
                    (0.0, 0.0)
                };

                let efficiency_pct = if is_valid_odds(reference_odds) {
                    domestic_odds / reference_odds * 100.0
                } else {
                    0.0
                };

                Some(OutcomeEvaluation {
                    outcome,
                    domestic_odds,
                    reference_odds,
                    true_probability,
                    expected_value,
                    kelly_fraction,
                    efficiency_pct,
                })
            })
            .collect()
    }

    /// Outcomes whose expected value strictly exceeds `ev_threshold`
    pub fn find_opportunities(
        &self,
        domestic: &OddsQuote,
        reference: &OddsQuote,
        ev_threshold: f64,
    ) -> Vec<ValueOpportunity> {
        let now = Utc::now();
        self.evaluate(domestic, reference)
            .into_iter()
            .filter(|e| e.expected_value > ev_threshold)
            .map(|e| {
                debug!(
                    fixture = %domestic.fixture(),
                    outcome = %e.outcome,
                    ev = e.expected_value,
                    kelly = e.kelly_fraction,
                    "Value outcome"
                );
                ValueOpportunity {
                    id: Uuid::new_v4(),
                    fixture: domestic.fixture(),
                    reference_fixture: reference.fixture(),
                    sport: domestic.sport,
                    league: domestic.league.clone(),
                    outcome: e.outcome,
                    domestic_odds: e.domestic_odds,
                    reference_odds: e.reference_odds,
                    true_probability: e.true_probability,
                    expected_value: e.expected_value,
                    kelly_fraction: e.kelly_fraction,
                    tax_free_stake_ceiling: self.rules.tax_free_stake_ceiling(e.domestic_odds),
                    created_at: now,
                }
            })
            .collect()
    }

    pub fn find_value(
        &self,
        matched: &[MatchedFixture],
        ev_threshold: f64,
    ) -> Vec<ValueOpportunity> {
        let opportunities: Vec<ValueOpportunity> = matched
            .iter()
            .flat_map(|m| self.find_opportunities(&m.domestic, &m.reference, ev_threshold))
            .collect();

        info!(
            fixtures = matched.len(),
            opportunities = opportunities.len(),
            ev_threshold,
            "Value scan complete"
        );
        opportunities
    }

    /// Outcome where the domestic market pays closest to (or above) the reference
    pub fn best_outcome(
        &self,
        domestic: &OddsQuote,
        reference: &OddsQuote,
    ) -> Option<OutcomeEvaluation> {
        self.evaluate(domestic, reference)
            .into_iter()
            .filter(|e| e.efficiency_pct > 0.0)
            .max_by(|a, b| a.efficiency_pct.total_cmp(&b.efficiency_pct))
    }
}
