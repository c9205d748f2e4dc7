use serde::Serialize;

use super::probability::is_valid_odds;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KellyQuote {
    /// Net decimal payout per unit staked (odds - 1)
    pub b: f64,
    pub f_raw: f64,
    pub f_fractional: f64,
    pub f_capped: f64,
}

/// Fractional Kelly on decimal odds.
///
/// `f_raw = (p * odds - 1) / (odds - 1)`, floored at zero, scaled by
/// `fraction` and then bounded by `cap`. Odds ≤ 1.0 yield an all-zero quote.
pub fn compute_fractional_kelly(p_true: f64, odds: f64, fraction: f64, cap: f64) -> KellyQuote {
    if !is_valid_odds(odds) || !p_true.is_finite() {
        return KellyQuote::default();
    }

    let b = odds - 1.0;
    let f_raw = (p_true * odds - 1.0) / b;
    let f_fractional = f_raw.max(0.0) * fraction.max(0.0);
    let f_capped = f_fractional.min(cap.max(0.0));

    KellyQuote {
        b,
        f_raw,
        f_fractional,
        f_capped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kelly_zero_when_negative_edge() {
        let q = compute_fractional_kelly(0.45, 2.0, 0.25, 0.25);
        assert!(q.f_raw < 0.0);
        assert_eq!(q.f_capped, 0.0);
    }

    #[test]
    fn eighth_kelly_on_positive_edge() {
        // p=0.6 at evens: full Kelly 0.2, eighth 0.025
        let q = compute_fractional_kelly(0.6, 2.0, 0.125, 0.25);
        assert!((q.f_raw - 0.2).abs() < 1e-12);
        assert!((q.f_capped - 0.025).abs() < 1e-12);
    }

    #[test]
    fn cap_bounds_large_edges() {
        let q = compute_fractional_kelly(0.9, 5.0, 1.0, 0.25);
        assert_eq!(q.f_capped, 0.25);
    }

    #[test]
    fn degenerate_odds_are_zero() {
        for odds in [1.0, 0.5, 0.0, -3.0, f64::NAN] {
            let q = compute_fractional_kelly(0.7, odds, 0.125, 0.25);
            assert_eq!(q.f_capped, 0.0);
            assert_eq!(q.f_raw, 0.0);
        }
    }
}
