//! Text normalization shared by the extractor and the searchers

use std::collections::BTreeSet;

/// Common English stopwords
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "up", "about", "into", "through", "during", "is", "was", "are", "were", "been", "be",
    "have", "has", "had", "do", "does", "did", "will", "would", "could", "should", "may",
    "might", "must", "can", "it", "this", "that", "as", "so",
];

/// Word endings a keyword may carry and still count as a hit
const INFLECTIONS: &[&str] = &["s", "es", "ed", "d"];

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-fold and collapse whitespace
pub fn normalize(text: &str) -> String {
    collapse_whitespace(text).to_lowercase()
}

/// Lower-cased content tokens: split on anything non-alphanumeric, drop
/// stopwords and one-character tokens, fold simple plurals.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 1 && !STOPWORDS.contains(w))
        .map(fold_plural)
        .collect()
}

fn fold_plural(word: &str) -> String {
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Whether `keyword` occurs in `haystack` as a whole word (or phrase).
///
/// Both sides are expected lower-case. Anything that is not alphanumeric is a
/// word boundary, so `edi` hits `edi_err_1` but not `immediately`. The match
/// may carry a plural or past-tense ending (`containers`, `duplicated`).
pub fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    if keyword.is_empty() {
        return false;
    }

    let mut start = 0;
    while let Some(pos) = haystack[start..].find(keyword) {
        let begin = start + pos;
        let end = begin + keyword.len();

        let left_ok = haystack[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());

        if left_ok {
            let tail = haystack[end..]
                .split(|c: char| !c.is_alphanumeric())
                .next()
                .unwrap_or("");
            if tail.is_empty() || INFLECTIONS.contains(&tail) {
                return true;
            }
        }

        start = end;
    }

    false
}

/// Whether `term` occurs in `haystack` exactly, as a whole value.
///
/// Used for entity values such as `edi_err_1` or `ref-ift-0007`. Unlike
/// [`contains_keyword`] no inflection is accepted, and `_` counts as part of
/// the value, so `edi_err_1` does not hit `edi_err_12` or `x_edi_err_1`.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }

    haystack.match_indices(term).any(|(begin, _)| {
        let end = begin + term.len();
        let left_ok = haystack[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| !is_term_char(c));
        let right_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !is_term_char(c));
        left_ok && right_ok
    })
}

fn is_term_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Jaccard similarity of two token sets. Two empty sets share nothing.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_must_match_whole_value() {
        assert!(contains_term("error edi_err_1 raised", "edi_err_1"));
        assert!(contains_term("edi_err_1", "edi_err_1"));
        assert!(contains_term("parked ref-ift-0007; retry", "ref-ift-0007"));
        assert!(contains_term("mv lion city 07: advice", "lion city 07"));
        assert!(!contains_term("error edi_err_12 unrelated", "edi_err_1"));
        assert!(!contains_term("vessel_err_42", "vessel_err_4"));
        assert!(!contains_term("db_edi_err_1", "edi_err_1"));
        assert!(!contains_term("cmau00000201", "cmau0000020"));
        assert!(contains_term("edi_err_12 then edi_err_1", "edi_err_1"));
        assert!(!contains_term("anything", ""));
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  EDI   message\n\tSTUCK "), "edi message stuck");
    }

    #[test]
    fn test_tokenize_drops_stopwords_and_folds_plurals() {
        let tokens = tokenize("Customer seeing duplicate containers for CMAU0000020");
        assert!(tokens.contains("container"));
        assert!(tokens.contains("cmau0000020"));
        assert!(!tokens.contains("for"));
    }

    #[test]
    fn test_tokenize_splits_codes() {
        let tokens = tokenize("REF-IFT-0007 VESSEL_ERR_4");
        assert!(tokens.contains("ref"));
        assert!(tokens.contains("ift"));
        assert!(tokens.contains("0007"));
        assert!(tokens.contains("vessel"));
        assert!(tokens.contains("err"));
        assert!(!tokens.contains("4"));
    }

    #[test]
    fn test_keyword_word_boundaries() {
        assert!(contains_keyword("edi message stuck", "edi"));
        assert!(contains_keyword("code edi_err_1 raised", "edi"));
        assert!(!contains_keyword("please fix immediately", "edi"));
        assert!(!contains_keyword("credit note", "edi"));
    }

    #[test]
    fn test_keyword_inflections_and_phrases() {
        assert!(contains_keyword("duplicate containers shown", "container"));
        assert!(contains_keyword("record duplicated twice", "duplicate"));
        assert!(contains_keyword("stuck in error status", "error status"));
        assert!(!contains_keyword("containerization", "container"));
    }

    #[test]
    fn test_keyword_later_occurrence() {
        assert!(contains_keyword("editor and then edi", "edi"));
    }

    #[test]
    fn test_jaccard() {
        let a = tokenize("edi message stuck");
        let b = tokenize("edi message stuck");
        let c = tokenize("vessel berth");
        assert_eq!(jaccard(&a, &b), 1.0);
        assert_eq!(jaccard(&a, &c), 0.0);
        assert_eq!(jaccard(&BTreeSet::new(), &BTreeSet::new()), 0.0);
    }
}
