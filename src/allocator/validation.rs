//! Structural slip rules
//!
//! Every rule is checked and every violation collected, so a slip can be
//! corrected in one pass.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::config::JurisdictionRules;
use crate::types::{MarketType, Outcome, Selection};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SlipViolation {
    #[error("slip needs at least {min} legs, got {got}")]
    TooFewLegs { min: usize, got: usize },

    #[error("slip allows at most {max} legs, got {got}")]
    TooManyLegs { max: usize, got: usize },

    #[error("cross-bet on '{fixture}': {first} and {second} markets cannot share a fixture")]
    CrossBet {
        fixture: String,
        first: MarketType,
        second: MarketType,
    },

    #[error("duplicate leg: {fixture} ({outcome}) selected more than once")]
    DuplicateLeg { fixture: String, outcome: Outcome },

    #[error("odds too low on {fixture}: {odds:.2} is below {min:.2}")]
    OddsTooLow { fixture: String, odds: f64, min: f64 },

    #[error("pick {outcome} on {fixture} does not belong to the {market} market")]
    PickMarketMismatch {
        fixture: String,
        outcome: Outcome,
        market: MarketType,
    },

    #[error("totals leg on {fixture} has no line")]
    MissingLine { fixture: String },
}

/// Check a slip against the jurisdiction's structural rules
pub fn validate(legs: &[Selection], rules: &JurisdictionRules) -> Vec<SlipViolation> {
    let mut violations = Vec::new();

    if legs.len() < rules.min_legs {
        violations.push(SlipViolation::TooFewLegs {
            min: rules.min_legs,
            got: legs.len(),
        });
    }
    if legs.len() > rules.max_legs {
        violations.push(SlipViolation::TooManyLegs {
            max: rules.max_legs,
            got: legs.len(),
        });
    }

    let mut markets: HashMap<String, MarketType> = HashMap::new();
    for leg in legs {
        let key = leg.fixture_ref();
        match markets.get(&key) {
            Some(first) if *first != leg.market_type => {
                violations.push(SlipViolation::CrossBet {
                    fixture: leg.fixture.to_string(),
                    first: *first,
                    second: leg.market_type,
                });
            }
            Some(_) => {}
            None => {
                markets.insert(key, leg.market_type);
            }
        }
    }

    let mut seen: HashSet<(String, Outcome)> = HashSet::new();
    for leg in legs {
        if !seen.insert((leg.fixture_ref(), leg.outcome)) {
            violations.push(SlipViolation::DuplicateLeg {
                fixture: leg.fixture.to_string(),
                outcome: leg.outcome,
            });
        }
    }

    for leg in legs {
        if !(leg.odds >= rules.min_leg_odds) {
            violations.push(SlipViolation::OddsTooLow {
                fixture: leg.fixture.to_string(),
                odds: leg.odds,
                min: rules.min_leg_odds,
            });
        }
        if leg.outcome.market_type() != leg.market_type {
            violations.push(SlipViolation::PickMarketMismatch {
                fixture: leg.fixture.to_string(),
                outcome: leg.outcome,
                market: leg.market_type,
            });
        }
        if leg.market_type == MarketType::Totals && leg.line.is_none() {
            violations.push(SlipViolation::MissingLine {
                fixture: leg.fixture.to_string(),
            });
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FixtureKey;

    fn fixture(n: usize) -> FixtureKey {
        FixtureKey::new(format!("홈{n}"), format!("원정{n}"))
    }

    #[test]
    fn legal_slip_has_no_violations() {
        let legs = vec![
            Selection::outright(fixture(1), Outcome::Home, 1.8),
            Selection::totals(fixture(2), Outcome::Over, 2.5, 1.9),
        ];
        assert!(validate(&legs, &JurisdictionRules::default()).is_empty());
    }

    #[test]
    fn cross_bet_mentions_both_markets() {
        let legs = vec![
            Selection::outright(fixture(1), Outcome::Home, 1.8),
            Selection::totals(fixture(1), Outcome::Under, 2.5, 1.9),
        ];
        let violations = validate(&legs, &JurisdictionRules::default());
        assert_eq!(violations.len(), 1);
        let message = violations[0].to_string();
        assert!(message.contains("outright"));
        assert!(message.contains("totals"));
    }

    #[test]
    fn all_violations_are_collected() {
        let legs = vec![
            Selection::outright(fixture(1), Outcome::Home, 1.0),
            Selection::outright(fixture(1), Outcome::Home, 1.8),
            Selection::outright(fixture(2), Outcome::Over, 1.9),
        ];
        let violations = validate(&legs, &JurisdictionRules::default());
        assert!(violations.contains(&SlipViolation::DuplicateLeg {
            fixture: fixture(1).to_string(),
            outcome: Outcome::Home,
        }));
        assert!(violations
            .iter()
            .any(|v| matches!(v, SlipViolation::OddsTooLow { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, SlipViolation::PickMarketMismatch { .. })));
    }

    #[test]
    fn size_limits() {
        let rules = JurisdictionRules::default();
        let one = vec![Selection::outright(fixture(1), Outcome::Home, 1.8)];
        assert_eq!(
            validate(&one, &rules),
            vec![SlipViolation::TooFewLegs { min: 2, got: 1 }]
        );

        let eleven: Vec<Selection> = (0..11)
            .map(|n| Selection::outright(fixture(n), Outcome::Away, 2.0))
            .collect();
        assert_eq!(
            validate(&eleven, &rules),
            vec![SlipViolation::TooManyLegs { max: 10, got: 11 }]
        );
    }

    #[test]
    fn fixture_id_identifies_legs() {
        let legs = vec![
            Selection::outright(fixture(1), Outcome::Home, 1.8).with_id("G1"),
            Selection::totals(fixture(9), Outcome::Over, 2.5, 1.9).with_id("G1"),
        ];
        let violations = validate(&legs, &JurisdictionRules::default());
        assert!(matches!(violations[0], SlipViolation::CrossBet { .. }));
    }
}
