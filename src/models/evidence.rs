use crate::error::AppError;
use crate::models::{CaseRecord, Contact, KbPassage, LogEntry};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A ranked item with its relevance score (0.0 - 1.0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult<T> {
    pub item: T,
    pub score: f64,
}

impl<T> MatchResult<T> {
    pub fn new(item: T, score: f64) -> Self {
        Self { item, score }
    }
}

/// Where a piece of evidence (or a warning about it) came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EvidenceSource {
    Logs,
    Cases,
    KnowledgeBase,
    Contacts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WarningKind {
    /// The collaborator could not hand over its corpus
    MissingCorpus,
    /// The sub-search overran its budget
    Timeout,
    /// The sub-search worker died
    Failed,
}

/// Marker attached to a bundle when a source degraded to empty (or partial)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceWarning {
    pub source: EvidenceSource,
    pub kind: WarningKind,
    pub detail: String,
}

impl SourceWarning {
    /// Record why `source` contributed nothing; the kind follows the error
    pub fn from_error(source: EvidenceSource, err: &AppError) -> Self {
        let kind = match err {
            AppError::MissingCorpus { .. } => WarningKind::MissingCorpus,
            AppError::SearchTimeout { .. } => WarningKind::Timeout,
            _ => WarningKind::Failed,
        };

        Self {
            source,
            kind,
            detail: err.to_string(),
        }
    }

    pub fn timeout(source: EvidenceSource, timeout_ms: u64) -> Self {
        Self::from_error(
            source,
            &AppError::SearchTimeout {
                source_name: source.to_string(),
                timeout_ms,
            },
        )
    }
}

/// Summary of the ranked log matches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogAnalysis {
    pub error_count: usize,
    pub warning_count: usize,
    /// Services with at least one match, sorted
    pub affected_services: Vec<String>,
    /// Timestamped matches in chronological order
    pub timeline: Vec<LogEntry>,
    /// Human-readable observations
    pub patterns: Vec<String>,
}

/// Everything gathered for one incident, ready for the generative step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextBundle {
    /// Entity values and keywords the searches ran with
    pub search_terms: Vec<String>,

    pub log_matches: Vec<MatchResult<LogEntry>>,

    pub case_matches: Vec<MatchResult<CaseRecord>>,

    pub kb_matches: Vec<MatchResult<KbPassage>>,

    /// Contacts owning the incident's module, in escalation order
    pub contacts: Vec<Contact>,

    /// Management contacts pulled in for urgent incidents
    #[serde(default)]
    pub escalation_contacts: Vec<Contact>,

    pub log_analysis: LogAnalysis,

    /// Degraded sources; empty when every source answered
    #[serde(default)]
    pub warnings: Vec<SourceWarning>,
}

impl ContextBundle {
    /// Every source answered in time
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }

    /// No evidence from any of the three corpora
    pub fn has_no_evidence(&self) -> bool {
        self.log_matches.is_empty() && self.case_matches.is_empty() && self.kb_matches.is_empty()
    }

    pub fn total_matches(&self) -> usize {
        self.log_matches.len() + self.case_matches.len() + self.kb_matches.len()
    }

    /// Warnings raised by one source
    pub fn warnings_for(&self, source: EvidenceSource) -> impl Iterator<Item = &SourceWarning> {
        self.warnings.iter().filter(move |w| w.source == source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bundle() {
        let bundle = ContextBundle::default();
        assert!(bundle.is_complete());
        assert!(bundle.has_no_evidence());
        assert_eq!(bundle.total_matches(), 0);
    }

    #[test]
    fn test_warnings_for_source() {
        let bundle = ContextBundle {
            warnings: vec![
                SourceWarning::timeout(EvidenceSource::Cases, 50),
                SourceWarning::from_error(
                    EvidenceSource::Logs,
                    &AppError::missing_corpus("logs/edi_advice", "service gone"),
                ),
                SourceWarning::from_error(
                    EvidenceSource::KnowledgeBase,
                    &AppError::Internal("search task panicked".to_string()),
                ),
            ],
            ..Default::default()
        };

        assert!(!bundle.is_complete());
        let case_warnings: Vec<_> = bundle.warnings_for(EvidenceSource::Cases).collect();
        assert_eq!(case_warnings.len(), 1);
        assert_eq!(case_warnings[0].kind, WarningKind::Timeout);
        assert_eq!(case_warnings[0].detail, "Search over cases timed out after 50ms");

        let log_warnings: Vec<_> = bundle.warnings_for(EvidenceSource::Logs).collect();
        assert_eq!(log_warnings[0].kind, WarningKind::MissingCorpus);
        assert_eq!(
            log_warnings[0].detail,
            "Corpus unavailable (logs/edi_advice): service gone"
        );

        let kb_warnings: Vec<_> = bundle.warnings_for(EvidenceSource::KnowledgeBase).collect();
        assert_eq!(kb_warnings[0].kind, WarningKind::Failed);
    }
}
