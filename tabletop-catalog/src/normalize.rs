//! Name normalization and similarity scoring.
//!
//! Both the local ranking index and remote search scoring compare names in
//! normalized form, so "Tzolk'in" and "tzolkin" or "Café & Co." and
//! "cafe and co" compare equal.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Score given when the query's words appear, in order and contiguously,
/// inside the candidate's name ("descent" in "descent legends of the dark").
pub const CONTAINMENT_SCORE: f64 = 0.85;

/// Score given when the candidate's name is a contiguous run inside the
/// query ("azul" in "azul duel"). Sits between the default low and medium
/// thresholds: never a confident match, at best one to review.
pub const PARTIAL_NAME_SCORE: f64 = 0.65;

/// Normalize a game name for comparison.
///
/// Decomposes accented letters and drops the marks, folds a few letters that
/// don't decompose, lowercases, spells `&` as "and", removes apostrophes, and
/// collapses every other run of non-alphanumeric characters to one space.
///
/// ```
/// use tabletop_catalog::normalize_name;
///
/// assert_eq!(normalize_name("Café & Co."), "cafe and co");
/// assert_eq!(normalize_name("  Tzolk'in: The Mayan Calendar "), "tzolkin the mayan calendar");
/// ```
pub fn normalize_name(name: &str) -> String {
    let mut folded = String::with_capacity(name.len());

    for c in name.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        match c {
            '\'' | '\u{2019}' | '\u{2018}' | '`' => {}
            '&' => folded.push_str(" and "),
            'ß' => folded.push_str("ss"),
            'æ' | 'Æ' => folded.push_str("ae"),
            'œ' | 'Œ' => folded.push_str("oe"),
            'ø' | 'Ø' => folded.push('o'),
            'ł' | 'Ł' => folded.push('l'),
            'đ' | 'Đ' => folded.push('d'),
            'þ' | 'Þ' => folded.push_str("th"),
            c if c.is_alphanumeric() => folded.extend(c.to_lowercase()),
            _ => folded.push(' '),
        }
    }

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Similarity of a query to a candidate name, both already normalized, in
/// `[0, 1]`. Not symmetric.
///
/// Identical names score exactly 1.0 and nothing else does. Otherwise the
/// score is the larger of normalized Levenshtein similarity and a
/// containment score: [`CONTAINMENT_SCORE`] when the query's words form a
/// contiguous run inside the candidate, [`PARTIAL_NAME_SCORE`] when the
/// candidate's words form one inside the query.
pub fn similarity(query: &str, candidate: &str) -> f64 {
    if query.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    if query == candidate {
        return 1.0;
    }

    let edit = strsim::normalized_levenshtein(query, candidate).min(0.999);
    let contained = if contains_words(candidate, query) {
        CONTAINMENT_SCORE
    } else if contains_words(query, candidate) {
        PARTIAL_NAME_SCORE
    } else {
        0.0
    };
    edit.max(contained)
}

fn contains_words(haystack: &str, needle: &str) -> bool {
    let hay: Vec<&str> = haystack.split(' ').collect();
    let needle: Vec<&str> = needle.split(' ').collect();
    needle.len() < hay.len() && hay.windows(needle.len()).any(|w| w == needle.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics_and_folds_letters() {
        assert_eq!(normalize_name("Ørléans"), "orleans");
        assert_eq!(normalize_name("Straße"), "strasse");
        assert_eq!(normalize_name("Łódź"), "lodz");
    }

    #[test]
    fn punctuation_collapses_to_single_spaces() {
        assert_eq!(normalize_name("Star Wars: Rebellion -- 2nd ed."), "star wars rebellion 2nd ed");
        assert_eq!(normalize_name("?!"), "");
    }

    #[test]
    fn identical_names_score_one() {
        assert_eq!(similarity("catan", "catan"), 1.0);
        assert!(similarity("catan", "catans") < 1.0);
    }

    #[test]
    fn empty_names_score_zero() {
        assert_eq!(similarity("", "catan"), 0.0);
        assert_eq!(similarity("catan", ""), 0.0);
    }

    #[test]
    fn contained_words_score_containment() {
        let s = similarity("descent", "descent legends of the dark");
        assert!((s - CONTAINMENT_SCORE).abs() < f64::EPSILON);
        // Partial words don't count.
        assert!(similarity("scent", "descent legends of the dark") < CONTAINMENT_SCORE);
    }

    #[test]
    fn shorter_candidate_inside_query_scores_partial() {
        let s = similarity("azul duel", "azul");
        assert!((s - PARTIAL_NAME_SCORE).abs() < f64::EPSILON);
        assert!(similarity("azul", "azul duel") > s);
    }

    #[test]
    fn unrelated_names_score_low() {
        let s = similarity(&normalize_name("asdkjf12390"), &normalize_name("Catan"));
        assert!(s < 0.55);
    }
}
