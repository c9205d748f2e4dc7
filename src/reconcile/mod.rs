//! Entity Reconciler - pairs domestic quotes with reference quotes
//!
//! A domestic fixture ("맨시티 vs 리버풀") is matched against a reference
//! fixture ("Manchester City vs Liverpool") in strategy tiers:
//! 1. Exact dictionary lookup, domestic → reference and reference → domestic
//! 2. Prefix match (the domestic feed truncates names)
//! 3. Normalized substring containment against the mapped name
//!
//! Home and away must both resolve under the same tier. Unknown names never
//! match; callers list them as domestic-only or reference-only.

pub mod dictionary;
pub mod normalize;

pub use dictionary::{load_mapping_file, DictionaryStats, Direction, MappingPair, TeamDictionary};
pub use normalize::{contains_either, normalize, pair_key, prefix_related};

use anyhow::Result;
use chrono::Duration;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ReconcilerConfig;
use crate::error::EngineError;
use crate::types::OddsQuote;

/// Strategy tier that paired two fixtures, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MatchTier {
    Exact,
    Prefix,
    Substring,
}

impl MatchTier {
    pub const ALL: [MatchTier; 3] = [MatchTier::Exact, MatchTier::Prefix, MatchTier::Substring];
}

/// One domestic quote paired with the reference quote for the same event
#[derive(Debug, Clone, Serialize)]
pub struct MatchedFixture {
    pub domestic: OddsQuote,
    pub reference: OddsQuote,
    pub tier: MatchTier,
}

/// Full result of a reconciliation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct Reconciliation {
    pub matched: Vec<MatchedFixture>,
    pub domestic_only: Vec<OddsQuote>,
    pub reference_only: Vec<OddsQuote>,
}

pub struct Reconciler {
    dictionary: TeamDictionary,
    max_kickoff_skew: Duration,
}

impl Reconciler {
    pub fn new(dictionary: TeamDictionary, config: &ReconcilerConfig) -> Self {
        Self {
            dictionary,
            max_kickoff_skew: Duration::minutes(config.max_kickoff_skew_mins),
        }
    }

    /// Seeded dictionary plus the optional mapping file
    pub fn from_config(config: &ReconcilerConfig) -> Result<Self> {
        let mut dictionary = TeamDictionary::seeded();
        if let Some(path) = &config.mapping_file {
            let added = dictionary.extend_from_file(path)?;
            info!(path = %path, added, "Loaded extra team mappings");
        }
        Ok(Self::new(dictionary, config))
    }

    pub fn dictionary(&self) -> &TeamDictionary {
        &self.dictionary
    }

    pub fn add_mapping(&mut self, domestic: &str, reference: &str) -> Result<(), EngineError> {
        self.dictionary.add_mapping(domestic, reference)
    }

    pub fn translate(&self, name: &str, direction: Direction) -> Option<&str> {
        self.dictionary.translate(name, direction)
    }

    /// Whether a domestic fixture and a reference fixture are the same event.
    /// Home/away order matters.
    pub fn matches(
        &self,
        domestic_home: &str,
        domestic_away: &str,
        reference_home: &str,
        reference_away: &str,
    ) -> bool {
        self.match_tier(domestic_home, domestic_away, reference_home, reference_away)
            .is_some()
    }

    /// Strongest tier under which both teams resolve
    pub fn match_tier(
        &self,
        domestic_home: &str,
        domestic_away: &str,
        reference_home: &str,
        reference_away: &str,
    ) -> Option<MatchTier> {
        MatchTier::ALL.into_iter().find(|tier| {
            self.team_resolves(*tier, domestic_home, reference_home)
                && self.team_resolves(*tier, domestic_away, reference_away)
        })
    }

    fn team_resolves(&self, tier: MatchTier, domestic: &str, reference: &str) -> bool {
        let domestic_norm = normalize(domestic);
        let reference_norm = normalize(reference);
        if domestic_norm.is_empty() || reference_norm.is_empty() {
            return false;
        }
        let aliases = self.dictionary.aliases_exact(reference);

        match tier {
            MatchTier::Exact => {
                let forward = self
                    .dictionary
                    .reference_exact(domestic)
                    .is_some_and(|mapped| normalize(mapped) == reference_norm);
                forward || aliases.iter().any(|alias| normalize(alias) == domestic_norm)
            }
            MatchTier::Prefix => {
                let forward = self
                    .dictionary
                    .references_by_prefix(domestic)
                    .any(|mapped| normalize(mapped) == reference_norm);
                forward
                    || aliases
                        .iter()
                        .any(|alias| prefix_related(&normalize(alias), &domestic_norm))
            }
            MatchTier::Substring => {
                let forward = self
                    .dictionary
                    .reference_exact(domestic)
                    .into_iter()
                    .chain(self.dictionary.references_by_prefix(domestic))
                    .any(|mapped| contains_either(&normalize(mapped), &reference_norm));
                forward
                    || aliases
                        .iter()
                        .any(|alias| contains_either(&normalize(alias), &domestic_norm))
            }
        }
    }

    fn kickoff_compatible(&self, domestic: &OddsQuote, reference: &OddsQuote) -> bool {
        match (domestic.event_time, reference.event_time) {
            (Some(a), Some(b)) => (a - b).abs() <= self.max_kickoff_skew,
            _ => true,
        }
    }

    /// Pair quotes; each reference quote is used at most once.
    pub fn reconcile(
        &self,
        domestic: &[OddsQuote],
        reference: &[OddsQuote],
    ) -> Vec<MatchedFixture> {
        self.reconcile_with_leftovers(domestic, reference).matched
    }

    /// Pair quotes and report the quotes left unmatched on each side
    pub fn reconcile_with_leftovers(
        &self,
        domestic: &[OddsQuote],
        reference: &[OddsQuote],
    ) -> Reconciliation {
        let mut used = vec![false; reference.len()];
        let mut result = Reconciliation::default();

        for dom in domestic {
            let best = reference
                .iter()
                .enumerate()
                .filter(|(idx, _)| !used[*idx])
                .filter(|(_, r)| r.sport == dom.sport)
                .filter(|(_, r)| r.is_three_way() == dom.is_three_way())
                .filter(|(_, r)| self.kickoff_compatible(dom, r))
                .filter_map(|(idx, r)| {
                    self.match_tier(&dom.home_name, &dom.away_name, &r.home_name, &r.away_name)
                        .map(|tier| (tier, idx))
                })
                .min();

            match best {
                Some((tier, idx)) => {
                    used[idx] = true;
                    debug!(
                        domestic = %dom.fixture(),
                        reference = %reference[idx].fixture(),
                        ?tier,
                        "Fixture matched"
                    );
                    result.matched.push(MatchedFixture {
                        domestic: dom.clone(),
                        reference: reference[idx].clone(),
                        tier,
                    });
                }
                None => result.domestic_only.push(dom.clone()),
            }
        }

        result.reference_only = reference
            .iter()
            .zip(&used)
            .filter(|(_, used)| !**used)
            .map(|(quote, _)| quote.clone())
            .collect();

        info!(
            domestic = domestic.len(),
            reference = reference.len(),
            matched = result.matched.len(),
            domestic_only = result.domestic_only.len(),
            reference_only = result.reference_only.len(),
            "Reconciliation complete"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sport;
    use chrono::{TimeZone, Utc};

    fn reconciler() -> Reconciler {
        Reconciler::new(TeamDictionary::seeded(), &ReconcilerConfig::default())
    }

    fn quote(provider: &str, home: &str, away: &str, odds: (f64, Option<f64>, f64)) -> OddsQuote {
        OddsQuote {
            provider: provider.to_string(),
            sport: Sport::Soccer,
            league: "EPL".to_string(),
            home_name: home.to_string(),
            away_name: away.to_string(),
            home_odds: odds.0,
            draw_odds: odds.1,
            away_odds: odds.2,
            event_time: None,
        }
    }

    #[test]
    fn exact_dictionary_match() {
        let r = reconciler();
        assert_eq!(
            r.match_tier("맨시티", "리버풀", "Manchester City", "Liverpool"),
            Some(MatchTier::Exact)
        );
    }

    #[test]
    fn legal_suffix_does_not_block_exact_match() {
        let r = reconciler();
        assert_eq!(
            r.match_tier("세비야", "발렌시아", "Sevilla", "Valencia"),
            Some(MatchTier::Exact)
        );
    }

    #[test]
    fn truncated_names_match_by_prefix() {
        let r = reconciler();
        assert_eq!(
            r.match_tier("울버햄", "브렌트", "Wolverhampton Wanderers", "Brentford"),
            Some(MatchTier::Prefix)
        );
    }

    #[test]
    fn shortened_reference_name_matches_by_substring() {
        let r = reconciler();
        assert_eq!(
            r.match_tier("토트넘", "첼시", "Tottenham", "Chelsea"),
            Some(MatchTier::Substring)
        );
    }

    #[test]
    fn unknown_team_never_matches() {
        let r = reconciler();
        assert!(!r.matches("맨시티", "없는팀", "Manchester City", "Liverpool"));
        assert!(!r.matches("", "리버풀", "Manchester City", "Liverpool"));
    }

    #[test]
    fn home_away_order_matters_and_is_stable() {
        let r = reconciler();
        assert!(r.matches("맨시티", "리버풀", "Manchester City", "Liverpool"));
        assert!(!r.matches("맨시티", "리버풀", "Liverpool", "Manchester City"));
        for _ in 0..3 {
            assert!(r.matches("맨시티", "리버풀", "Manchester City", "Liverpool"));
        }
    }

    #[test]
    fn reconcile_pairs_each_reference_once_and_reports_leftovers() {
        let r = reconciler();
        let domestic = vec![
            quote("betman", "맨시티", "리버풀", (1.8, Some(3.5), 4.2)),
            quote("betman", "맨시티", "리버풀", (1.85, Some(3.4), 4.1)),
            quote("betman", "수원FC", "울산HD", (2.1, Some(3.1), 3.2)),
        ];
        let reference = vec![
            quote("pinnacle", "Manchester City", "Liverpool", (1.7, Some(3.9), 4.8)),
            quote("pinnacle", "Arsenal", "Chelsea", (2.0, Some(3.4), 3.9)),
        ];

        let result = r.reconcile_with_leftovers(&domestic, &reference);
        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.domestic_only.len(), 2);
        assert_eq!(result.reference_only.len(), 1);
        assert_eq!(result.reference_only[0].home_name, "Arsenal");
    }

    #[test]
    fn two_way_and_three_way_quotes_never_pair() {
        let r = reconciler();
        let domestic = vec![quote("betman", "맨시티", "리버풀", (1.8, Some(3.5), 4.2))];
        let reference = vec![quote("pinnacle", "Manchester City", "Liverpool", (1.4, None, 2.9))];
        assert!(r.reconcile(&domestic, &reference).is_empty());
    }

    #[test]
    fn distant_kickoffs_are_different_events() {
        let r = reconciler();
        let mut dom = quote("betman", "맨시티", "리버풀", (1.8, Some(3.5), 4.2));
        let mut reference =
            quote("pinnacle", "Manchester City", "Liverpool", (1.7, Some(3.9), 4.8));
        dom.event_time = Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
        reference.event_time = Some(Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap());
        assert!(r.reconcile(&[dom.clone()], &[reference.clone()]).is_empty());

        reference.event_time = Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap());
        assert_eq!(r.reconcile(&[dom], &[reference]).len(), 1);
    }

    #[test]
    fn strongest_tier_wins_between_candidates() {
        let r = reconciler();
        let domestic = vec![quote("betman", "토트넘", "첼시", (2.5, Some(3.3), 2.7))];
        let reference = vec![
            quote("pinnacle", "Tottenham", "Chelsea", (2.4, Some(3.5), 2.9)),
            quote("pinnacle", "Tottenham Hotspur", "Chelsea", (2.4, Some(3.5), 2.9)),
        ];
        let matched = r.reconcile(&domestic, &reference);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].tier, MatchTier::Exact);
        assert_eq!(matched[0].reference.home_name, "Tottenham Hotspur");
    }

    #[test]
    fn quotes_from_different_sports_never_pair() {
        let r = reconciler();
        let domestic = vec![quote("betman", "셀틱", "레인저스", (1.9, None, 1.9))];
        let mut basketball = quote("pinnacle", "Boston Celtics", "Rangers", (1.8, None, 2.0));
        basketball.sport = Sport::Basketball;
        assert!(r.reconcile(&domestic, &[basketball]).is_empty());

        let soccer = quote("pinnacle", "Celtic", "Rangers", (1.8, None, 2.0));
        assert_eq!(r.reconcile(&domestic, &[soccer]).len(), 1);
    }

    #[test]
    fn replaced_mapping_drops_old_pairing() {
        let mut r = reconciler();
        assert!(r.matches("라요", "헤타페", "Rayo Vallecano", "Getafe CF"));
        r.add_mapping("라요", "Rayo Majadahonda").unwrap();
        assert!(!r.matches("라요", "헤타페", "Rayo Vallecano", "Getafe CF"));
        assert_eq!(
            r.match_tier("라요", "헤타페", "Rayo Majadahonda", "Getafe CF"),
            Some(MatchTier::Exact)
        );
    }

    #[test]
    fn runtime_mapping_enables_match() {
        let mut r = reconciler();
        assert!(!r.matches("수원FC", "울산HD", "Suwon FC", "Ulsan Hyundai"));
        r.add_mapping("수원FC", "Suwon FC").unwrap();
        r.add_mapping("울산HD", "Ulsan Hyundai").unwrap();
        assert!(r.matches("수원FC", "울산HD", "Suwon FC", "Ulsan Hyundai"));
    }
}
