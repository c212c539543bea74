//! Markdown rendering of incidents and bundles for the generative step

use crate::models::{ContextBundle, IncidentRecord};
use std::fmt::Write;

const MAX_ERROR_LINES: usize = 3;
const MAX_CASES: usize = 3;
const MAX_PASSAGES: usize = 2;
const CASE_EXCERPT_CHARS: usize = 200;
const PASSAGE_EXCERPT_CHARS: usize = 300;

/// Render the evidence bundle as the context block of a prompt
pub fn format_context_for_prompt(bundle: &ContextBundle) -> String {
    let mut out = String::from("# Context Information\n\n");

    if !bundle.search_terms.is_empty() {
        let _ = writeln!(out, "Search terms: {}\n", bundle.search_terms.join(", "));
    }

    if !bundle.log_matches.is_empty() {
        let analysis = &bundle.log_analysis;
        out.push_str("## Application Logs\n");
        let _ = writeln!(out, "- Matched lines: {}", bundle.log_matches.len());
        let _ = writeln!(out, "- Errors: {}", analysis.error_count);
        let _ = writeln!(out, "- Warnings: {}", analysis.warning_count);
        let _ = writeln!(
            out,
            "- Affected services: {}",
            analysis.affected_services.join(", ")
        );

        let errors: Vec<_> = bundle
            .log_matches
            .iter()
            .filter(|m| m.item.is_error())
            .take(MAX_ERROR_LINES)
            .collect();
        if !errors.is_empty() {
            out.push_str("\n### Key Error Messages\n");
            for (i, m) in errors.iter().enumerate() {
                let _ = writeln!(out, "{}. [{}] {}", i + 1, m.item.service_name, m.item.message);
            }
        }

        if !analysis.patterns.is_empty() {
            out.push_str("\n### Patterns\n");
            for pattern in &analysis.patterns {
                let _ = writeln!(out, "- {}", pattern);
            }
        }
        out.push('\n');
    }

    if !bundle.case_matches.is_empty() {
        out.push_str("## Similar Historical Cases\n");
        for (i, m) in bundle.case_matches.iter().take(MAX_CASES).enumerate() {
            let case = &m.item;
            let _ = writeln!(
                out,
                "\n### Case {} - {} (similarity {:.0}%)",
                i + 1,
                case.case_id,
                m.score * 100.0
            );
            let _ = writeln!(out, "Module: {}", case.module);
            let _ = writeln!(out, "Problem: {}", excerpt(&case.description, CASE_EXCERPT_CHARS));
            let _ = writeln!(
                out,
                "Solution: {}",
                excerpt(&case.resolution_steps, CASE_EXCERPT_CHARS)
            );
        }
        out.push('\n');
    }

    if !bundle.kb_matches.is_empty() {
        out.push_str("## Knowledge Base Articles\n");
        for (i, m) in bundle.kb_matches.iter().take(MAX_PASSAGES).enumerate() {
            let passage = &m.item;
            let marker = if passage.is_procedure() { " [procedure]" } else { "" };
            let _ = writeln!(out, "\n### Article {}: {}{}", i + 1, passage.heading(), marker);
            let _ = writeln!(out, "{}", excerpt(&passage.text, PASSAGE_EXCERPT_CHARS));
        }
        out.push('\n');
    }

    if !bundle.contacts.is_empty() || !bundle.escalation_contacts.is_empty() {
        out.push_str("## Escalation Contacts\n");
        for contact in bundle.contacts.iter().chain(&bundle.escalation_contacts) {
            let _ = write!(out, "- {} ({})", contact.name, contact.role);
            if let Some(email) = &contact.email {
                let _ = write!(out, " <{}>", email);
            }
            out.push('\n');
        }
        out.push('\n');
    }

    if !bundle.warnings.is_empty() {
        out.push_str("## Incomplete Evidence\n");
        for warning in &bundle.warnings {
            let _ = writeln!(out, "- {} ({}): {}", warning.source, warning.kind, warning.detail);
        }
        out.push('\n');
    }

    if bundle.has_no_evidence() {
        out.push_str("No matching logs, cases or knowledge-base articles were found.\n");
    }

    out
}

/// Human-readable summary of an extracted incident
pub fn format_incident_summary(record: &IncidentRecord) -> String {
    let mut out = String::from("Incident Summary\n================\n");
    let _ = writeln!(out, "Type: {}", record.incident_type);
    let _ = writeln!(out, "Module: {}", record.module);
    let _ = writeln!(out, "Severity: {}", record.severity);
    let _ = writeln!(
        out,
        "Confidence: {} ({:.2})",
        record.confidence_level(),
        record.confidence
    );

    out.push_str("\nEntities Found:\n");
    if record.entities.is_empty() {
        out.push_str("  (none)\n");
    }
    for (kind, value) in record.entities.iter() {
        let _ = writeln!(out, "  {}: {}", kind, value);
    }

    if !record.keywords.is_empty() {
        let _ = writeln!(out, "\nKeywords: {}", record.keywords.join(", "));
    }

    out
}

/// First `max_chars` characters, with an ellipsis when cut
fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CaseRecord, Contact, ContactRole, EvidenceSource, IncidentType, KbPassage, MatchResult,
        Module, SourceWarning,
    };

    #[test]
    fn test_excerpt_is_char_safe() {
        assert_eq!(excerpt("héllo", 10), "héllo");
        assert_eq!(excerpt("héllo", 2), "hé...");
    }

    #[test]
    fn test_empty_bundle_says_so() {
        let text = format_context_for_prompt(&ContextBundle::default());
        assert!(text.starts_with("# Context Information"));
        assert!(text.contains("No matching logs"));
    }

    #[test]
    fn test_sections_rendered() {
        let bundle = ContextBundle {
            case_matches: vec![MatchResult::new(
                CaseRecord::new(
                    "C001",
                    "EDI message stuck",
                    "Requeue the message",
                    Module::Edi,
                    IncidentType::StuckProcess,
                    "resolved",
                ),
                0.82,
            )],
            kb_matches: vec![MatchResult::new(
                KbPassage::new(
                    vec!["EDI".into(), "Stuck Messages".into()],
                    "Step 1: requeue",
                    0,
                ),
                0.5,
            )],
            contacts: vec![Contact::new("Ana", ContactRole::L3Engineer, Module::Edi)
                .with_email("ana@example.com")],
            warnings: vec![SourceWarning::timeout(EvidenceSource::Logs, 20)],
            ..Default::default()
        };

        let text = format_context_for_prompt(&bundle);
        assert!(text.contains("### Case 1 - C001 (similarity 82%)"));
        assert!(text.contains("### Article 1: EDI > Stuck Messages [procedure]"));
        assert!(text.contains("- Ana (L3) <ana@example.com>"));
        assert!(text.contains("- logs (timeout): Search over logs timed out after 20ms"));
        assert!(!text.contains("No matching logs"));
    }
}
