//! Domestic ↔ reference team name dictionary
//!
//! The domestic market uses 3-4 character Korean abbreviations; the
//! reference market uses full English names. Both lookup directions are built
//! once from a single canonical list of pairs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, warn};

use super::normalize::{contains_either, normalize, prefix_related};
use crate::error::EngineError;

/// Lookup direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    DomesticToReference,
    ReferenceToDomestic,
}

/// One mapping pair, as stored in a mapping file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingPair {
    pub domestic: String,
    pub reference: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DictionaryStats {
    pub pairs: usize,
    pub domestic_keys: usize,
    pub reference_keys: usize,
    pub collisions: usize,
}

/// Bidirectional team name dictionary
#[derive(Debug, Clone, Default)]
pub struct TeamDictionary {
    /// Raw domestic name → reference name
    domestic_to_reference: HashMap<String, String>,
    /// Raw reference name → every domestic alias, first inserted first
    reference_to_domestic: HashMap<String, Vec<String>>,
    /// Normalized domestic name → reference name
    domestic_index: BTreeMap<String, String>,
    /// Normalized reference name → domestic aliases
    reference_index: BTreeMap<String, Vec<String>>,
    pairs: usize,
    collisions: usize,
}

impl TeamDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dictionary pre-loaded with the major football leagues and the NBA
    pub fn seeded() -> Self {
        Self::from_pairs(SEED_PAIRS.iter().copied())
    }

    /// Build from a canonical pair list.
    ///
    /// A domestic name that is already mapped to a different reference name
    /// keeps its first mapping; the conflict is counted and logged.
    pub fn from_pairs<I, D, R>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (D, R)>,
        D: Into<String>,
        R: Into<String>,
    {
        let mut dictionary = Self::new();
        for (domestic, reference) in pairs {
            dictionary.insert(domestic.into(), reference.into(), false);
        }
        if dictionary.collisions > 0 {
            warn!(
                collisions = dictionary.collisions,
                "Conflicting team mappings ignored while building dictionary"
            );
        }
        dictionary
    }

    /// Add a mapping at runtime; an explicit mapping replaces an existing
    /// forward entry for the same domestic name.
    pub fn add_mapping(&mut self, domestic: &str, reference: &str) -> Result<(), EngineError> {
        let domestic = domestic.trim();
        let reference = reference.trim();
        if domestic.is_empty() || reference.is_empty() {
            return Err(EngineError::EmptyMappingName);
        }
        self.insert(domestic.to_string(), reference.to_string(), true);
        debug!(domestic, reference, "Team mapping added");
        Ok(())
    }

    /// Extend with pairs from a YAML file (a list of `{domestic, reference}`)
    pub fn extend_from_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let pairs = load_mapping_file(path)?;
        let count = pairs.len();
        for pair in pairs {
            self.insert(pair.domestic, pair.reference, true);
        }
        Ok(count)
    }

    fn insert(&mut self, domestic: String, reference: String, replace: bool) {
        let domestic_norm = normalize(&domestic);
        let reference_norm = normalize(&reference);

        if let Some(existing) = self.domestic_to_reference.get(&domestic) {
            if *existing == reference {
                return;
            }
            if !replace {
                warn!(
                    domestic = %domestic,
                    kept = %existing,
                    ignored = %reference,
                    "Team mapping collision"
                );
                self.collisions += 1;
                return;
            }
            let previous = existing.clone();
            self.remove_alias(&previous, &domestic);
            debug!(domestic = %domestic, previous = %previous, "Team mapping replaced");
            self.pairs -= 1;
        }

        self.domestic_to_reference
            .insert(domestic.clone(), reference.clone());
        let normalized_conflict = matches!(
            self.domestic_index.get(&domestic_norm),
            Some(existing) if *existing != reference
        );
        if normalized_conflict && !replace {
            self.collisions += 1;
        } else {
            self.domestic_index.insert(domestic_norm, reference.clone());
        }

        let aliases = self.reference_to_domestic.entry(reference).or_default();
        if !aliases.contains(&domestic) {
            aliases.push(domestic.clone());
        }
        let aliases = self.reference_index.entry(reference_norm).or_default();
        if !aliases.contains(&domestic) {
            aliases.push(domestic);
        }
        self.pairs += 1;
    }

    /// Detach `domestic` from the alias lists of `reference`
    fn remove_alias(&mut self, reference: &str, domestic: &str) {
        if let Some(aliases) = self.reference_to_domestic.get_mut(reference) {
            aliases.retain(|alias| alias != domestic);
            if aliases.is_empty() {
                self.reference_to_domestic.remove(reference);
            }
        }
        let reference_norm = normalize(reference);
        if let Some(aliases) = self.reference_index.get_mut(&reference_norm) {
            aliases.retain(|alias| alias != domestic);
            if aliases.is_empty() {
                self.reference_index.remove(&reference_norm);
            }
        }
    }

    /// Reference name for a domestic name via exact or normalized-exact lookup
    pub fn reference_exact(&self, domestic: &str) -> Option<&str> {
        self.domestic_to_reference
            .get(domestic)
            .or_else(|| self.domestic_index.get(&normalize(domestic)))
            .map(String::as_str)
    }

    /// Reference names whose domestic key is prefix-related to `domestic`
    pub fn references_by_prefix<'a>(
        &'a self,
        domestic: &str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        let needle = normalize(domestic);
        self.domestic_index
            .iter()
            .filter(move |(key, _)| prefix_related(key, &needle))
            .map(|(_, reference)| reference.as_str())
    }

    /// Domestic aliases of a reference name via exact or normalized-exact lookup
    pub fn aliases_exact(&self, reference: &str) -> &[String] {
        self.reference_to_domestic
            .get(reference)
            .or_else(|| self.reference_index.get(&normalize(reference)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Translate a name; absence of an entry is `None`, never an error.
    ///
    /// Domestic → reference tries exact, normalized, then prefix (truncated
    /// names). Reference → domestic tries exact, normalized, then normalized
    /// containment, returning the primary alias. The fuzzy passes answer only
    /// when exactly one team fits.
    pub fn translate(&self, name: &str, direction: Direction) -> Option<&str> {
        match direction {
            Direction::DomesticToReference => self
                .reference_exact(name)
                .or_else(|| sole(self.references_by_prefix(name))),
            Direction::ReferenceToDomestic => {
                if let Some(primary) = self.aliases_exact(name).first() {
                    return Some(primary.as_str());
                }
                let needle = normalize(name);
                if needle.is_empty() {
                    return None;
                }
                sole(
                    self.reference_index
                        .iter()
                        .filter(|(key, _)| contains_either(key, &needle))
                        .filter_map(|(_, aliases)| aliases.first())
                        .map(String::as_str),
                )
            }
        }
    }

    pub fn stats(&self) -> DictionaryStats {
        DictionaryStats {
            pairs: self.pairs,
            domestic_keys: self.domestic_index.len(),
            reference_keys: self.reference_index.len(),
            collisions: self.collisions,
        }
    }
}

/// The single distinct item, or `None` when there are zero or several
fn sole<'a>(mut candidates: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let first = candidates.next()?;
    match candidates.find(|other| *other != first) {
        Some(other) => {
            debug!(first, other, "Ambiguous team name");
            None
        }
        None => Some(first),
    }
}

/// Read mapping pairs from a YAML file
pub fn load_mapping_file(path: impl AsRef<Path>) -> Result<Vec<MappingPair>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read mapping file {}", path.display()))?;
    let pairs: Vec<MappingPair> = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse mapping file {}", path.display()))?;
    Ok(pairs)
}

/// Canonical seed list: domestic abbreviation, reference name
const SEED_PAIRS: &[(&str, &str)] = &[
    // EPL
    ("맨시티", "Manchester City"),
    ("리버풀", "Liverpool"),
    ("아스널", "Arsenal"),
    ("첼시", "Chelsea"),
    ("토트넘", "Tottenham Hotspur"),
    ("맨유", "Manchester United"),
    ("뉴캐슬U", "Newcastle United"),
    ("A빌라", "Aston Villa"),
    ("브라이턴", "Brighton and Hove Albion"),
    ("웨스햄", "West Ham United"),
    ("풀럼", "Fulham"),
    ("본머스", "AFC Bournemouth"),
    ("크리스탈", "Crystal Palace"),
    ("노팅엄", "Nottingham Forest"),
    ("울버햄프", "Wolverhampton Wanderers"),
    ("에버턴", "Everton"),
    ("번리", "Burnley"),
    ("브렌트포", "Brentford"),
    ("레스터C", "Leicester City"),
    ("사우샘프", "Southampton"),
    ("이프스위", "Ipswich Town"),
    ("리즈U", "Leeds United"),
    ("선덜랜드", "Sunderland"),
    // La Liga
    ("레알마드", "Real Madrid"),
    ("바르셀로", "Barcelona"),
    ("AT마드", "Atletico Madrid"),
    ("소시에다", "Real Sociedad"),
    ("비야레알", "Villarreal CF"),
    ("베티스", "Real Betis"),
    ("세비야", "Sevilla FC"),
    ("발렌시아", "Valencia CF"),
    ("셀타비고", "Celta Vigo"),
    ("RC셀타", "Celta Vigo"),
    ("에스파뇰", "Espanyol"),
    ("마요르카", "RCD Mallorca"),
    ("라요", "Rayo Vallecano"),
    ("오사수나", "CA Osasuna"),
    ("알라베스", "Deportivo Alaves"),
    ("헤타페", "Getafe CF"),
    ("빌바오", "Athletic Bilbao"),
    ("히로나", "Girona FC"),
    ("레반테", "Levante UD"),
    ("오비에도", "Real Oviedo"),
    // Bundesliga
    ("바이뮌헨", "Bayern Munich"),
    ("도르트문", "Borussia Dortmund"),
    ("레버쿠젠", "Bayer Leverkusen"),
    ("라이프치", "RB Leipzig"),
    ("프랑크푸", "Eintracht Frankfurt"),
    ("아인트라", "Eintracht Frankfurt"),
    ("슈투트가", "VfB Stuttgart"),
    ("프라이부", "SC Freiburg"),
    ("볼프스부", "VfL Wolfsburg"),
    ("묀헨글라", "Borussia Monchengladbach"),
    ("호펜하임", "TSG Hoffenheim"),
    ("브레멘", "Werder Bremen"),
    ("아우크스", "FC Augsburg"),
    ("하이덴하", "1. FC Heidenheim"),
    ("U베를린", "Union Berlin"),
    ("쾰른", "FC Koln"),
    ("마인츠", "1. FSV Mainz 05"),
    ("장크트파", "FC St. Pauli"),
    ("함부르크", "Hamburger SV"),
    // Serie A
    ("인테르", "Inter Milan"),
    ("유벤투스", "Juventus"),
    ("나폴리", "SSC Napoli"),
    ("AC밀란", "AC Milan"),
    ("AS로마", "AS Roma"),
    ("라치오", "SS Lazio"),
    ("아탈란타", "Atalanta BC"),
    ("피오렌티", "ACF Fiorentina"),
    ("볼로냐", "Bologna FC"),
    ("토리노", "Torino FC"),
    ("우디네세", "Udinese"),
    ("사수올로", "US Sassuolo"),
    ("제노아", "Genoa CFC"),
    ("칼리아리", "Cagliari"),
    ("레체", "US Lecce"),
    ("베로나", "Hellas Verona"),
    ("엘라스", "Hellas Verona"),
    ("코모1907", "Como 1907"),
    ("파르마", "Parma Calcio 1913"),
    ("크레모네", "US Cremonese"),
    ("피사", "AC Pisa 1909"),
    // Ligue 1
    ("파리SG", "Paris Saint-Germain"),
    ("PSG", "Paris Saint-Germain"),
    ("마르세유", "Olympique Marseille"),
    ("리옹", "Olympique Lyonnais"),
    ("릴OSC", "Lille OSC"),
    ("모나코", "AS Monaco"),
    ("OGC니스", "OGC Nice"),
    ("RC스트라", "RC Strasbourg"),
    ("렌", "Stade Rennais"),
    ("낭트", "FC Nantes"),
    ("툴루즈", "Toulouse FC"),
    ("르아브르", "Le Havre AC"),
    ("브레스투", "Stade Brestois 29"),
    ("로리앙", "FC Lorient"),
    ("메스", "FC Metz"),
    ("오세르", "AJ Auxerre"),
    ("앙제SCO", "Angers SCO"),
    ("앙제", "Angers SCO"),
    ("파리FC", "Paris FC"),
    // Eredivisie
    ("아약스", "Ajax"),
    ("PSV", "PSV Eindhoven"),
    ("페예노르", "Feyenoord"),
    ("알크마르", "AZ Alkmaar"),
    ("트벤테", "FC Twente"),
    ("위트레흐", "FC Utrecht"),
    ("헤이렌베", "SC Heerenveen"),
    ("스파로테", "Sparta Rotterdam"),
    ("고어헤드", "Go Ahead Eagles"),
    ("네이메헌", "NEC Nijmegen"),
    // Championship
    ("노리치C", "Norwich City"),
    ("밀월", "Millwall"),
    ("왓포드", "Watford"),
    ("퀸즈파크", "Queens Park Rangers"),
    ("블랙번", "Blackburn Rovers"),
    ("스토크C", "Stoke City"),
    ("버밍엄C", "Birmingham City"),
    ("스완지C", "Swansea City"),
    ("프레스턴", "Preston North End"),
    ("셰필드웬", "Sheffield Wednesday"),
    ("셰필드U", "Sheffield United"),
    ("웨스브로", "West Bromwich Albion"),
    ("코번트리", "Coventry City"),
    ("미들즈브", "Middlesbrough"),
    // J-League
    ("가와사키", "Kawasaki Frontale"),
    ("가시와", "Kashiwa Reysol"),
    ("G오사카", "Gamba Osaka"),
    ("C오사카", "Cerezo Osaka"),
    ("나고야", "Nagoya Grampus"),
    ("요코하마M", "Yokohama F. Marinos"),
    ("우라와레", "Urawa Red Diamonds"),
    ("산프레체", "Sanfrecce Hiroshima"),
    ("비셀고베", "Vissel Kobe"),
    // UEFA
    ("벤피카", "SL Benfica"),
    ("포르투", "FC Porto"),
    ("스포르팅", "Sporting CP"),
    ("갈라타사", "Galatasaray"),
    ("페네르바", "Fenerbahce"),
    ("셀틱", "Celtic"),
    ("레인저스", "Rangers"),
    ("클뤼브", "Club Brugge"),
    ("잘츠부르", "Red Bull Salzburg"),
    ("올림피아", "Olympiacos"),
    // NBA
    ("올랜매직", "Orlando Magic"),
    ("밀워벅스", "Milwaukee Bucks"),
    ("LA레이커", "Los Angeles Lakers"),
    ("골든스워", "Golden State Warriors"),
    ("보스셀틱", "Boston Celtics"),
    ("마이히트", "Miami Heat"),
    ("댈매브릭", "Dallas Mavericks"),
    ("피닉스선", "Phoenix Suns"),
    ("시카불스", "Chicago Bulls"),
    ("필76인즈", "Philadelphia 76ers"),
    ("뉴욕닉스", "New York Knicks"),
    ("브루넷츠", "Brooklyn Nets"),
    ("덴너기츠", "Denver Nuggets"),
    ("미네울버", "Minnesota Timberwolves"),
    ("클리캐벌", "Cleveland Cavaliers"),
    ("인디페이", "Indiana Pacers"),
    ("새크킹즈", "Sacramento Kings"),
    ("샬럿호네", "Charlotte Hornets"),
    ("디트피스", "Detroit Pistons"),
    ("뉴올펠리", "New Orleans Pelicans"),
    ("샌안스퍼", "San Antonio Spurs"),
    ("멤그리즈", "Memphis Grizzlies"),
    ("포틀블레", "Portland Trail Blazers"),
    ("유타재즈", "Utah Jazz"),
    ("토론래프", "Toronto Raptors"),
    ("워싱위저", "Washington Wizards"),
    ("오클썬더", "Oklahoma City Thunder"),
    ("LA클리퍼", "Los Angeles Clippers"),
    ("휴스로키", "Houston Rockets"),
    ("애틀호크", "Atlanta Hawks"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_dictionary_translates_both_ways() {
        let dict = TeamDictionary::seeded();
        assert_eq!(
            dict.translate("맨시티", Direction::DomesticToReference),
            Some("Manchester City")
        );
        assert_eq!(
            dict.translate("Manchester City", Direction::ReferenceToDomestic),
            Some("맨시티")
        );
    }

    #[test]
    fn reverse_map_keeps_every_alias() {
        let dict = TeamDictionary::seeded();
        let aliases = dict.aliases_exact("Paris Saint-Germain");
        assert_eq!(aliases, &["파리SG".to_string(), "PSG".to_string()]);
        assert_eq!(dict.stats().collisions, 0);
    }

    #[test]
    fn truncated_domestic_name_resolves_by_prefix() {
        let dict = TeamDictionary::seeded();
        assert_eq!(
            dict.translate("울버햄", Direction::DomesticToReference),
            Some("Wolverhampton Wanderers")
        );
    }

    #[test]
    fn unknown_name_is_none() {
        let dict = TeamDictionary::seeded();
        assert_eq!(dict.translate("없는팀", Direction::DomesticToReference), None);
        assert_eq!(dict.translate("Nowhere Rovers", Direction::ReferenceToDomestic), None);
    }

    #[test]
    fn conflicting_pairs_keep_first_and_count_collision() {
        let dict =
            TeamDictionary::from_pairs([("라요", "Rayo Vallecano"), ("라요", "Rayo Majadahonda")]);
        assert_eq!(dict.reference_exact("라요"), Some("Rayo Vallecano"));
        assert_eq!(dict.stats().collisions, 1);
        assert_eq!(dict.stats().pairs, 1);
    }

    #[test]
    fn runtime_mapping_overrides_and_rejects_empty() {
        let mut dict = TeamDictionary::seeded();
        dict.add_mapping("수원FC", "Suwon FC").unwrap();
        assert_eq!(dict.reference_exact("수원FC"), Some("Suwon FC"));
        assert_eq!(
            dict.translate("Suwon FC", Direction::ReferenceToDomestic),
            Some("수원FC")
        );
        assert_eq!(dict.add_mapping(" ", "Suwon FC"), Err(EngineError::EmptyMappingName));

        let pairs = dict.stats().pairs;
        dict.add_mapping("라요", "Rayo Majadahonda").unwrap();
        assert_eq!(dict.reference_exact("라요"), Some("Rayo Majadahonda"));
        assert_eq!(
            dict.translate("Rayo Majadahonda", Direction::ReferenceToDomestic),
            Some("라요")
        );
        assert!(dict.aliases_exact("Rayo Vallecano").is_empty());
        assert_eq!(dict.translate("Rayo Vallecano", Direction::ReferenceToDomestic), None);
        assert_eq!(dict.stats().pairs, pairs);
    }

    #[test]
    fn replaced_alias_leaves_other_aliases_in_place() {
        let mut dict = TeamDictionary::seeded();
        dict.add_mapping("PSG", "Paris FC").unwrap();
        assert_eq!(dict.aliases_exact("Paris Saint-Germain"), &["파리SG".to_string()]);
        assert_eq!(dict.aliases_exact("Paris FC"), &["파리FC".to_string(), "PSG".to_string()]);
    }

    #[test]
    fn ambiguous_partial_names_are_not_guessed() {
        let dict = TeamDictionary::seeded();
        assert_eq!(dict.translate("Real", Direction::ReferenceToDomestic), None);
        assert_eq!(dict.translate("City", Direction::ReferenceToDomestic), None);
        assert_eq!(dict.translate("파리", Direction::DomesticToReference), None);
        assert_eq!(
            dict.translate("Real Madrid", Direction::ReferenceToDomestic),
            Some("레알마드")
        );
        assert_eq!(
            dict.translate("Wolverhampton", Direction::ReferenceToDomestic),
            Some("울버햄프")
        );
    }

    #[test]
    fn mapping_file_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("valuebet-mapping-{}.yaml", std::process::id()));
        std::fs::write(
            &path,
            "- domestic: 울산HD\n  reference: Ulsan Hyundai\n\
             - domestic: 전북\n  reference: Jeonbuk Motors\n",
        )
        .unwrap();
        let mut dict = TeamDictionary::new();
        assert_eq!(dict.extend_from_file(&path).unwrap(), 2);
        assert_eq!(dict.reference_exact("전북"), Some("Jeonbuk Motors"));
        std::fs::remove_file(&path).ok();
    }
}
