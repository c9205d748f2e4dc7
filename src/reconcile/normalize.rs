//! Team name normalization shared by the reconciler and the score cache

/// Tokens dropped before comparison ("FC Porto" == "Porto")
const LEGAL_SUFFIXES: &[&str] = &[
    "fc", "sc", "cf", "afc", "ssc", "acf", "us", "ss", "vfl", "vfb", "spvgg",
];

/// Shortest side allowed to take part in a prefix or containment relation
pub const MIN_PARTIAL_CHARS: usize = 2;

/// Case-fold, drop punctuation/whitespace and legal suffix tokens.
///
/// "1. FC Köln" → "1köln", "Brighton and Hove Albion" → "brightonandhovealbion",
/// "뉴캐슬U" → "뉴캐슬u".
pub fn normalize(name: &str) -> String {
    name.split_whitespace()
        .map(|token| {
            token
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|token| !token.is_empty() && !LEGAL_SUFFIXES.contains(&token.as_str()))
        .collect()
}

/// Either normalized name is a prefix of the other.
///
/// The domestic feed truncates names to a fixed character budget, so a
/// truncated name must still meet its dictionary key.
pub fn prefix_related(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    short.chars().count() >= MIN_PARTIAL_CHARS && long.starts_with(short)
}

/// Either normalized name contains the other
pub fn contains_either(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    short.chars().count() >= MIN_PARTIAL_CHARS && long.contains(short)
}

/// Order-sensitive fixture key, e.g. "manchestercity_vs_liverpool"
pub fn pair_key(home: &str, away: &str) -> String {
    format!("{}_vs_{}", normalize(home), normalize(away))
}
