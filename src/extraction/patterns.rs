//! Structural entity patterns

use crate::extraction::keywords::{MODULE_KEYWORDS, TYPE_KEYWORDS};
use crate::models::{EntityKind, IncidentEntities};
use once_cell::sync::Lazy;
use regex::Regex;

/// ISO 6346 style container number: owner code + serial + check digit
static CONTAINER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b[A-Z]{4}\d{7}\b").expect("container pattern is valid"));

/// `<MODULE>_ERR_<digits>`, e.g. `EDI_ERR_1`, `VESSEL_ERR_4`
static ERROR_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[A-Z][A-Z0-9]*(?:_[A-Z0-9]+)*_ERR[_-]\d+\b")
        .expect("error code pattern is valid")
});

/// Reference ids follow one of the known ticket/message prefixes
static REFERENCE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:REF|TCK|INC|ALR|SMS)-[A-Z0-9@]+(?:-[A-Z0-9@]+)*")
        .expect("reference pattern is valid")
});

/// Capitalized words (and voyage numbers) after an `MV` / `vessel` cue
static VESSEL_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?P<cue>(?i:MV|M/V|vessel))\s+(?P<name>[A-Z][A-Za-z0-9]*(?:\s+(?:[A-Z][A-Za-z0-9]*|\d+[A-Za-z]?))*(?:/\d+[A-Z]?)?)",
    )
    .expect("vessel pattern is valid")
});

/// Run every pattern over whitespace-collapsed text and keep every match.
///
/// Container ids, error codes and reference ids match regardless of case.
/// Vessel names rely on capitalization to find where the name ends, so that
/// pattern sees the text as written. Container ids are kept as written; error
/// codes and reference ids are stored upper-cased.
pub fn extract_entities(text: &str) -> IncidentEntities {
    let mut entities = IncidentEntities::default();

    for m in CONTAINER_ID.find_iter(text) {
        entities.insert(EntityKind::ContainerId, m.as_str().to_string());
    }

    for m in ERROR_CODE.find_iter(text) {
        entities.insert(EntityKind::ErrorCode, m.as_str().to_uppercase());
    }

    for m in REFERENCE_ID.find_iter(text) {
        entities.insert(EntityKind::ReferenceId, m.as_str().to_uppercase());
    }

    for caps in VESSEL_NAME.captures_iter(text) {
        let (Some(cue), Some(name)) = (caps.name("cue"), caps.name("name")) else {
            continue;
        };

        let name = drop_code_prefix(name.as_str(), &text[name.end()..]);
        let bare_cue = cue.as_str().eq_ignore_ascii_case("vessel");
        if let Some(name) = accept_vessel_name(name, bare_cue) {
            entities.insert(EntityKind::VesselName, name);
        }
    }

    entities
}

/// The last captured word may be the head of a code such as `VESSEL_ERR_4`
/// or `EDI-7`; it is not part of the name.
fn drop_code_prefix<'a>(name: &'a str, rest: &str) -> &'a str {
    let mut chars = rest.chars();
    let glued = match chars.next() {
        Some('_') => true,
        Some('-') => chars.next().map_or(false, |c| c.is_alphanumeric()),
        _ => false,
    };

    if !glued {
        return name;
    }
    name.rsplit_once(char::is_whitespace)
        .map_or("", |(head, _)| head)
        .trim_end()
}

/// Validate a captured name.
///
/// After a bare `vessel` cue the name needs at least two words and must not
/// open with an incident-vocabulary word ("Vessel Advice failed" is not a
/// vessel called "Advice"). An `MV` prefix inside the capture counts as the
/// stronger cue.
fn accept_vessel_name(captured: &str, bare_cue: bool) -> Option<String> {
    let trimmed = captured.trim();
    let has_mv_prefix = trimmed.starts_with("MV ") || trimmed.starts_with("M/V ");
    let name = clean_vessel_name(trimmed);
    if name.is_empty() {
        return None;
    }

    if bare_cue && !has_mv_prefix {
        let mut words = name.split_whitespace();
        let first = words.next().unwrap_or_default().to_lowercase();
        if words.next().is_none() || is_classification_word(&first) {
            return None;
        }
    }

    Some(name)
}

fn is_classification_word(word: &str) -> bool {
    MODULE_KEYWORDS
        .iter()
        .flat_map(|(_, table)| table.iter())
        .chain(TYPE_KEYWORDS.iter().flat_map(|(_, table)| table.iter()))
        .any(|(keyword, _)| *keyword == word)
}

/// "vessel MV Lion City" captures "MV Lion City"; keep only the name
fn clean_vessel_name(name: &str) -> String {
    let trimmed = name.trim();
    let stripped = ["MV ", "M/V "]
        .iter()
        .find_map(|cue| trimmed.strip_prefix(cue))
        .unwrap_or(trimmed);
    stripped.trim().to_string()
}

/// Module hinted by an error code prefix, e.g. `EDI_ERR_1` -> `EDI`
pub fn error_code_prefix(code: &str) -> &str {
    code.split('_').next().unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_id_exact() {
        let e = extract_entities("Customer seeing duplicate containers for CMAU0000020");
        assert!(e.container_ids.contains("CMAU0000020"));
        assert_eq!(e.distinct_count(), 1);
    }

    #[test]
    fn test_container_id_needs_word_boundary() {
        let e = extract_entities("XCMAU00000201 is not a container");
        assert!(e.container_ids.is_empty());
    }

    #[test]
    fn test_error_codes_all_kept() {
        let e = extract_entities("Saw EDI_ERR_1 then vessel_err_4 and DB_CONN_ERR_12");
        assert!(e.error_codes.contains("EDI_ERR_1"));
        assert!(e.error_codes.contains("VESSEL_ERR_4"));
        assert!(e.error_codes.contains("DB_CONN_ERR_12"));
    }

    #[test]
    fn test_reference_id() {
        let e = extract_entities("EDI message REF-IFT-0007 stuck; see tck-1234");
        assert!(e.reference_ids.contains("REF-IFT-0007"));
        assert!(e.reference_ids.contains("TCK-1234"));
    }

    #[test]
    fn test_vessel_name_after_mv() {
        let e = extract_entities("Cannot create vessel advice for MV Lion City 07 - VESSEL_ERR_4");
        assert!(e.vessel_names.contains("Lion City 07"));
        assert_eq!(e.vessel_names.len(), 1);
    }

    #[test]
    fn test_vessel_cue_followed_by_mv() {
        let e = extract_entities("Delay on vessel MV Ever Given/012E at berth");
        assert!(e.vessel_names.contains("Ever Given/012E"));
    }

    #[test]
    fn test_lowercase_after_vessel_is_not_a_name() {
        let e = extract_entities("the vessel advice could not be created");
        assert!(e.vessel_names.is_empty());
    }

    #[test]
    fn test_lowercase_container_id_kept_as_written() {
        let e = extract_entities("customer seeing duplicate containers for cmau0000020");
        assert!(e.container_ids.contains("cmau0000020"));
        assert_eq!(e.container_ids.len(), 1);
    }

    #[test]
    fn test_vessel_name_stops_before_error_code() {
        let e = extract_entities("Advice rejected for MV Lion City 07 VESSEL_ERR_4");
        assert_eq!(
            e.vessel_names.iter().collect::<Vec<_>>(),
            vec!["Lion City 07"]
        );
        assert!(e.error_codes.contains("VESSEL_ERR_4"));
    }

    #[test]
    fn test_bare_vessel_cue_needs_a_real_name() {
        let e = extract_entities("Vessel Advice failed for MV Lion City 07");
        assert_eq!(
            e.vessel_names.iter().collect::<Vec<_>>(),
            vec!["Lion City 07"]
        );

        let e = extract_entities("Vessel Berth Schedule is late");
        assert!(e.vessel_names.is_empty());

        let e = extract_entities("Delay on vessel Ever Given at berth");
        assert!(e.vessel_names.contains("Ever Given"));
    }

    #[test]
    fn test_mv_followed_only_by_code_yields_no_name() {
        let e = extract_entities("MV VESSEL_ERR_4 raised twice");
        assert!(e.vessel_names.is_empty());
    }

    #[test]
    fn test_error_code_prefix() {
        assert_eq!(error_code_prefix("EDI_ERR_1"), "EDI");
        assert_eq!(error_code_prefix("VESSEL_ERR_4"), "VESSEL");
    }
}
