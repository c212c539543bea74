use crate::models::{LogAnalysis, LogEntry, MatchResult};
use std::collections::BTreeSet;

/// Longest timeline kept in the analysis
pub const MAX_TIMELINE_EVENTS: usize = 20;

const MULTIPLE_ERRORS_THRESHOLD: usize = 5;
const MULTIPLE_SERVICES_THRESHOLD: usize = 2;
const SEQUENCE_THRESHOLD: usize = 3;

/// Summarize the ranked log matches
pub fn analyze_logs(matches: &[MatchResult<LogEntry>]) -> LogAnalysis {
    let error_count = matches.iter().filter(|m| m.item.is_error()).count();
    let warning_count = matches.iter().filter(|m| m.item.is_warning()).count();

    let affected_services: Vec<String> = matches
        .iter()
        .map(|m| m.item.service_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut timeline: Vec<LogEntry> = matches
        .iter()
        .filter(|m| m.item.timestamp.is_some())
        .map(|m| m.item.clone())
        .collect();
    timeline.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.service_name.cmp(&b.service_name))
            .then_with(|| a.line_number.cmp(&b.line_number))
    });
    timeline.truncate(MAX_TIMELINE_EVENTS);

    let mut patterns = Vec::new();
    if error_count > MULTIPLE_ERRORS_THRESHOLD {
        patterns.push(format!("Multiple errors detected ({} errors)", error_count));
    }
    if affected_services.len() > MULTIPLE_SERVICES_THRESHOLD {
        patterns.push(format!(
            "Multiple services affected: {}",
            affected_services.join(", ")
        ));
    }
    if timeline.len() > SEQUENCE_THRESHOLD {
        patterns.push("Errors occurred in sequence - check timeline".to_string());
    }

    LogAnalysis {
        error_count,
        warning_count,
        affected_services,
        timeline,
        patterns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(service: &str, n: usize, line: &str) -> MatchResult<LogEntry> {
        MatchResult::new(LogEntry::parse_line(service, n, line).unwrap(), 0.5)
    }

    #[test]
    fn test_empty_matches() {
        let analysis = analyze_logs(&[]);
        assert_eq!(analysis, LogAnalysis::default());
    }

    #[test]
    fn test_counts_and_chronological_timeline() {
        let matches = vec![
            entry("edi", 2, "2025-10-09T08:30:00.000Z ERROR svc failed"),
            entry("edi", 1, "2025-10-09T08:29:00.000Z WARN svc retry"),
            entry("container", 5, "no timestamp ERROR here"),
        ];

        let analysis = analyze_logs(&matches);
        assert_eq!(analysis.error_count, 1);
        assert_eq!(analysis.warning_count, 1);
        assert_eq!(analysis.affected_services, vec!["container", "edi"]);
        assert_eq!(analysis.timeline.len(), 2);
        assert_eq!(analysis.timeline[0].line_number, 1);
        assert!(analysis.patterns.is_empty());
    }

    #[test]
    fn test_patterns_flagged() {
        let matches: Vec<_> = (0..6)
            .map(|i| {
                entry(
                    ["edi", "vessel", "container"][i % 3],
                    i + 1,
                    &format!("2025-10-09T08:0{}:00.000Z ERROR svc boom", i),
                )
            })
            .collect();

        let analysis = analyze_logs(&matches);
        assert_eq!(analysis.error_count, 6);
        assert_eq!(analysis.patterns.len(), 3);
        assert!(analysis.patterns[0].starts_with("Multiple errors detected"));
    }
}
