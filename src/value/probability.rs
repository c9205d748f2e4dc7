//! De-vigging of reference odds into a true probability distribution

use serde::Serialize;

use crate::types::{OddsQuote, Outcome};

/// Usable decimal odds: finite and strictly above evens-minus-stake
pub fn is_valid_odds(odds: f64) -> bool {
    odds.is_finite() && odds > 1.0
}

pub fn implied_probability(odds: f64) -> Option<f64> {
    is_valid_odds(odds).then(|| 1.0 / odds)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    Normal,
    /// Malformed input odds; the distribution is uniform and must not drive stakes
    Low,
}

/// Vig-free probabilities over a quote's outcomes; sums to 1.0
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrueProbabilityDistribution {
    probabilities: Vec<(Outcome, f64)>,
    pub confidence: Confidence,
    /// Bookmaker overround removed (sum of implied probabilities - 1)
    pub margin: f64,
}

impl TrueProbabilityDistribution {
    pub fn get(&self, outcome: Outcome) -> Option<f64> {
        self.probabilities
            .iter()
            .find(|(o, _)| *o == outcome)
            .map(|(_, p)| *p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Outcome, f64)> + '_ {
        self.probabilities.iter().copied()
    }

    pub fn total(&self) -> f64 {
        self.probabilities.iter().map(|(_, p)| p).sum()
    }

    pub fn is_low_confidence(&self) -> bool {
        self.confidence == Confidence::Low
    }
}

/// Remove the bookmaker margin by normalizing implied probabilities.
///
/// If any offered odds are ≤ 1.0 (or not finite) the result is a uniform
/// distribution over the offered outcomes flagged `Confidence::Low`.
pub fn true_probabilities(quote: &OddsQuote) -> TrueProbabilityDistribution {
    let priced: Vec<(Outcome, f64)> = quote
        .outcomes()
        .into_iter()
        .filter_map(|o| quote.odds_for(o).map(|odds| (o, odds)))
        .collect();

    let implied: Option<Vec<(Outcome, f64)>> = priced
        .iter()
        .map(|(o, odds)| implied_probability(*odds).map(|p| (*o, p)))
        .collect();

    match implied {
        Some(implied) if !implied.is_empty() => {
            let book: f64 = implied.iter().map(|(_, p)| p).sum();
            TrueProbabilityDistribution {
                probabilities: implied.into_iter().map(|(o, p)| (o, p / book)).collect(),
                confidence: Confidence::Normal,
                margin: book - 1.0,
            }
        }
        _ => {
            let n = priced.len().max(1) as f64;
            TrueProbabilityDistribution {
                probabilities: priced.into_iter().map(|(o, _)| (o, 1.0 / n)).collect(),
                confidence: Confidence::Low,
                margin: 0.0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sport;

    fn quote(home: f64, draw: Option<f64>, away: f64) -> OddsQuote {
        OddsQuote {
            provider: "pinnacle".into(),
            sport: Sport::Soccer,
            league: String::new(),
            home_name: "Manchester City".into(),
            away_name: "Liverpool".into(),
            home_odds: home,
            draw_odds: draw,
            away_odds: away,
            event_time: None,
        }
    }

    #[test]
    fn three_way_distribution_sums_to_one() {
        let dist = true_probabilities(&quote(1.70, Some(3.90), 4.80));
        assert!((dist.total() - 1.0).abs() < 1e-9);
        assert!((dist.get(Outcome::Home).unwrap() - 0.5586).abs() < 0.001);
        assert!((dist.get(Outcome::Draw).unwrap() - 0.2435).abs() < 0.001);
        assert!((dist.get(Outcome::Away).unwrap() - 0.1979).abs() < 0.001);
        assert!(dist.margin > 0.0);
        assert_eq!(dist.confidence, Confidence::Normal);
    }

    #[test]
    fn two_way_distribution_has_no_draw() {
        let dist = true_probabilities(&quote(1.90, None, 1.90));
        assert_eq!(dist.get(Outcome::Draw), None);
        assert!((dist.get(Outcome::Home).unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn malformed_odds_give_uniform_low_confidence() {
        let dist = true_probabilities(&quote(1.0, Some(3.2), 0.0));
        assert!(dist.is_low_confidence());
        for (_, p) in dist.iter() {
            assert!((p - 1.0 / 3.0).abs() < 1e-12);
        }
        assert!((dist.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn random_valid_odds_always_normalize() {
        let mut odds = 1.01;
        while odds < 30.0 {
            let dist = true_probabilities(&quote(odds, Some(odds * 1.7 + 0.3), 31.0 - odds));
            assert!((dist.total() - 1.0).abs() < 1e-6);
            assert!(dist.iter().all(|(_, p)| p > 0.0 && p < 1.0));
            odds += 0.37;
        }
    }
}
