use crate::models::{IncidentType, Module};
use crate::search::text::tokenize;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::{Display, EnumString};

static LOG_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<ts>\S+)\s+(?P<level>DEBUG|INFO|WARN|WARNING|ERROR)\s+(?P<component>\S+)\s*(?P<message>.*)$",
    )
    .expect("log line pattern is valid")
});

/// One application log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Service whose log file this line came from
    pub service_name: String,

    /// Parsed timestamp, if the line carried one
    pub timestamp: Option<DateTime<Utc>>,

    pub level: LogLevel,

    /// Emitting component as written on the line
    pub component: String,

    pub message: String,

    pub raw_line: String,

    /// 1-based position in the service's log
    pub line_number: usize,
}

impl LogEntry {
    /// Parse `2025-10-09T08:25:33.050Z INFO component message...`.
    ///
    /// Lines that do not follow the layout are kept whole as the message with
    /// an `Unknown` level. Blank lines yield `None`.
    pub fn parse_line(service_name: &str, line_number: usize, line: &str) -> Option<Self> {
        let raw_line = line.trim();
        if raw_line.is_empty() {
            return None;
        }

        if let Some(caps) = LOG_LINE.captures(raw_line) {
            let timestamp = DateTime::parse_from_rfc3339(&caps["ts"])
                .ok()
                .map(|ts| ts.with_timezone(&Utc));
            let level = caps["level"].parse().unwrap_or(LogLevel::Unknown);

            return Some(Self {
                service_name: service_name.to_string(),
                timestamp,
                level,
                component: caps["component"].to_string(),
                message: caps["message"].trim().to_string(),
                raw_line: raw_line.to_string(),
                line_number,
            });
        }

        let timestamp = raw_line
            .split_whitespace()
            .next()
            .and_then(|first| DateTime::parse_from_rfc3339(first).ok())
            .map(|ts| ts.with_timezone(&Utc));

        Some(Self {
            service_name: service_name.to_string(),
            timestamp,
            level: LogLevel::Unknown,
            component: "unknown".to_string(),
            message: raw_line.to_string(),
            raw_line: raw_line.to_string(),
            line_number,
        })
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warn
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    #[strum(to_string = "WARN", serialize = "WARNING")]
    Warn,
    Error,
    Unknown,
}

/// Historical incident with a known resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCaseRecord")]
pub struct CaseRecord {
    pub case_id: String,
    pub description: String,
    pub resolution_steps: String,
    pub module: Module,
    pub incident_type: IncidentType,
    /// Token set derived from the description
    pub keywords: BTreeSet<String>,
    pub outcome: String,
}

impl CaseRecord {
    pub fn new(
        case_id: impl Into<String>,
        description: impl Into<String>,
        resolution_steps: impl Into<String>,
        module: Module,
        incident_type: IncidentType,
        outcome: impl Into<String>,
    ) -> Self {
        let description = description.into();
        let keywords = tokenize(&description);

        Self {
            case_id: case_id.into(),
            description,
            resolution_steps: resolution_steps.into(),
            module,
            incident_type,
            keywords,
            outcome: outcome.into(),
        }
    }
}

/// Wire shape of a case export; keywords are always re-derived.
#[derive(Debug, Deserialize)]
struct RawCaseRecord {
    case_id: String,
    description: String,
    #[serde(default)]
    resolution_steps: String,
    #[serde(default = "default_module")]
    module: Module,
    #[serde(default = "default_incident_type")]
    incident_type: IncidentType,
    #[serde(default)]
    outcome: String,
}

impl From<RawCaseRecord> for CaseRecord {
    fn from(raw: RawCaseRecord) -> Self {
        CaseRecord::new(
            raw.case_id,
            raw.description,
            raw.resolution_steps,
            raw.module,
            raw.incident_type,
            raw.outcome,
        )
    }
}

fn default_module() -> Module {
    Module::Other
}

fn default_incident_type() -> IncidentType {
    IncidentType::Other
}

/// Paragraph of the knowledge base with the headings above it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbPassage {
    /// Section titles from outermost to innermost
    pub heading_path: Vec<String>,
    pub text: String,
    /// Position in the document
    pub passage_index: usize,
}

impl KbPassage {
    pub fn new(heading_path: Vec<String>, text: impl Into<String>, passage_index: usize) -> Self {
        Self {
            heading_path,
            text: text.into(),
            passage_index,
        }
    }

    /// Headings joined as a breadcrumb
    pub fn heading(&self) -> String {
        self.heading_path.join(" > ")
    }

    /// Whether the passage reads like a step-by-step procedure
    pub fn is_procedure(&self) -> bool {
        let lower = self.text.to_lowercase();
        ["step", "procedure", "sop"]
            .iter()
            .any(|marker| lower.contains(marker))
            || (lower.contains("1.") && lower.contains("2."))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum ContactRole {
    #[serde(rename = "L3", alias = "l3", alias = "L3 Engineer")]
    #[strum(to_string = "L3", serialize = "L3 Engineer")]
    L3Engineer,
    #[serde(rename = "team-lead", alias = "Team Lead", alias = "lead")]
    #[strum(to_string = "team-lead", serialize = "Team Lead")]
    TeamLead,
    #[serde(rename = "management", alias = "Management", alias = "manager")]
    #[strum(to_string = "management", serialize = "Manager")]
    Management,
}

impl ContactRole {
    /// Escalation order (lower first)
    pub fn priority(&self) -> u8 {
        match self {
            ContactRole::L3Engineer => 0,
            ContactRole::TeamLead => 1,
            ContactRole::Management => 2,
        }
    }
}

/// Escalation contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub role: ContactRole,
    #[serde(default = "default_module")]
    pub module: Module,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Contact {
    pub fn new(name: impl Into<String>, role: ContactRole, module: Module) -> Self {
        Self {
            name: name.into(),
            role,
            module,
            email: None,
            phone: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_structured_line() {
        let entry = LogEntry::parse_line(
            "edi_advice",
            7,
            "2025-10-09T08:25:33.050Z ERROR edi-advice-service EDI_ERR_1 segment missing\n",
        )
        .unwrap();

        assert_eq!(entry.service_name, "edi_advice");
        assert_eq!(entry.level, LogLevel::Error);
        assert_eq!(entry.component, "edi-advice-service");
        assert_eq!(entry.message, "EDI_ERR_1 segment missing");
        assert_eq!(entry.line_number, 7);
        assert_eq!(
            entry.timestamp.unwrap().to_rfc3339(),
            "2025-10-09T08:25:33.050+00:00"
        );
        assert!(entry.is_error());
    }

    #[test]
    fn test_parse_unstructured_line() {
        let entry = LogEntry::parse_line("container", 1, "stack trace continues here").unwrap();
        assert_eq!(entry.level, LogLevel::Unknown);
        assert!(entry.timestamp.is_none());
        assert_eq!(entry.message, "stack trace continues here");
    }

    #[test]
    fn test_parse_bad_timestamp_kept_as_none() {
        let entry = LogEntry::parse_line("container", 2, "yesterday WARN svc disk nearly full").unwrap();
        assert!(entry.timestamp.is_none());
        assert!(entry.is_warning());
        assert_eq!(entry.component, "svc");
    }

    #[test]
    fn test_blank_line_skipped() {
        assert!(LogEntry::parse_line("container", 3, "   ").is_none());
    }

    #[test]
    fn test_case_keywords_derived_from_description() {
        let case = CaseRecord::new(
            "C1",
            "Duplicate container records after gate in",
            "Merge rows",
            Module::Container,
            IncidentType::DuplicateEntry,
            "resolved",
        );
        assert!(case.keywords.contains("duplicate"));
        assert!(case.keywords.contains("container"));
        assert!(!case.keywords.contains("merge"));
    }

    #[test]
    fn test_case_deserialize_derives_keywords() {
        let json = r#"{
            "case_id": "C9",
            "description": "EDI message stuck",
            "module": "EDI/API",
            "incident_type": "stuck_process"
        }"#;
        let case: CaseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(case.module, Module::Edi);
        assert!(case.keywords.contains("stuck"));
        assert_eq!(case.outcome, "");
    }

    #[test]
    fn test_procedure_detection() {
        let steps = KbPassage::new(vec!["EDI".into()], "Step 1: requeue. Step 2: verify.", 0);
        let prose = KbPassage::new(vec!["EDI".into()], "Messages are retried hourly.", 1);
        assert!(steps.is_procedure());
        assert!(!prose.is_procedure());
        assert_eq!(steps.heading(), "EDI");
    }

    #[test]
    fn test_contact_role_priority() {
        assert!(ContactRole::L3Engineer.priority() < ContactRole::TeamLead.priority());
        let role: ContactRole = serde_json::from_str("\"L3\"").unwrap();
        assert_eq!(role, ContactRole::L3Engineer);
    }
}
