use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::{Display, EnumString};

/// Structured view of a free-text incident report.
///
/// Built once per request by [`crate::extraction::IncidentExtractor`] and
/// never mutated afterwards; every downstream search borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Original report text
    pub raw_text: String,

    /// Typed values pulled out of the text
    pub entities: IncidentEntities,

    /// Winning incident type
    pub incident_type: IncidentType,

    /// Winning functional module
    pub module: Module,

    /// Estimated severity
    pub severity: Severity,

    /// Classification confidence (0.0 - 1.0)
    pub confidence: f64,

    /// Classification keywords that hit, sorted
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl IncidentRecord {
    /// Coarse confidence tier
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_score(self.confidence)
    }

    /// Entity values and matched keywords, de-duplicated and sorted
    pub fn search_terms(&self) -> Vec<String> {
        let mut terms: BTreeSet<String> = self.entities.values().cloned().collect();
        terms.extend(self.keywords.iter().cloned());
        terms.into_iter().collect()
    }

    /// Stable fingerprint of everything the searches depend on.
    ///
    /// Every field and list is length-prefixed, so no two distinct records
    /// feed the hasher the same byte stream.
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};

        fn field(hasher: &mut Sha256, bytes: &[u8]) {
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }

        let mut hasher = Sha256::new();
        field(&mut hasher, self.raw_text.as_bytes());
        field(&mut hasher, self.incident_type.to_string().as_bytes());
        field(&mut hasher, self.module.to_string().as_bytes());
        field(&mut hasher, self.severity.to_string().as_bytes());

        let entities: Vec<_> = self.entities.iter().collect();
        hasher.update((entities.len() as u64).to_le_bytes());
        for (kind, value) in entities {
            field(&mut hasher, kind.to_string().as_bytes());
            field(&mut hasher, value.as_bytes());
        }

        hasher.update((self.keywords.len() as u64).to_le_bytes());
        for keyword in &self.keywords {
            field(&mut hasher, keyword.as_bytes());
        }

        format!("{:x}", hasher.finalize())
    }
}

/// Entity values grouped by kind. Sets keep the output order deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentEntities {
    #[serde(default)]
    pub container_ids: BTreeSet<String>,
    #[serde(default)]
    pub vessel_names: BTreeSet<String>,
    #[serde(default)]
    pub error_codes: BTreeSet<String>,
    #[serde(default)]
    pub reference_ids: BTreeSet<String>,
}

impl IncidentEntities {
    pub fn is_empty(&self) -> bool {
        self.distinct_count() == 0
    }

    pub fn distinct_count(&self) -> usize {
        self.container_ids.len()
            + self.vessel_names.len()
            + self.error_codes.len()
            + self.reference_ids.len()
    }

    /// Insert a value under its kind
    pub fn insert(&mut self, kind: EntityKind, value: String) -> bool {
        match kind {
            EntityKind::ContainerId => self.container_ids.insert(value),
            EntityKind::VesselName => self.vessel_names.insert(value),
            EntityKind::ErrorCode => self.error_codes.insert(value),
            EntityKind::ReferenceId => self.reference_ids.insert(value),
        }
    }

    /// All values tagged with their kind
    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &String)> {
        self.container_ids
            .iter()
            .map(|v| (EntityKind::ContainerId, v))
            .chain(self.vessel_names.iter().map(|v| (EntityKind::VesselName, v)))
            .chain(self.error_codes.iter().map(|v| (EntityKind::ErrorCode, v)))
            .chain(self.reference_ids.iter().map(|v| (EntityKind::ReferenceId, v)))
    }

    /// All values regardless of kind
    pub fn values(&self) -> impl Iterator<Item = &String> {
        self.iter().map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    ContainerId,
    VesselName,
    ErrorCode,
    ReferenceId,
}

/// Incident classification. Declaration order is the tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IncidentType {
    DuplicateEntry,
    StuckProcess,
    Timeout,
    ErrorStatus,
    Other,
}

impl IncidentType {
    /// Words that identify this type in a knowledge-base heading
    pub fn heading_terms(&self) -> &'static [&'static str] {
        match self {
            IncidentType::DuplicateEntry => &["duplicate"],
            IncidentType::StuckProcess => &["stuck"],
            IncidentType::Timeout => &["timeout", "time out"],
            IncidentType::ErrorStatus => &["error"],
            IncidentType::Other => &[],
        }
    }
}

/// Functional subsystem. Declaration order is the tie-break priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Module {
    #[serde(rename = "EDI", alias = "EDI/API", alias = "edi")]
    #[strum(to_string = "EDI", serialize = "EDI/API")]
    Edi,
    #[serde(alias = "vessel")]
    Vessel,
    #[serde(alias = "container")]
    Container,
    #[serde(alias = "database")]
    Database,
    #[serde(alias = "other", alias = "General")]
    #[strum(to_string = "Other", serialize = "General")]
    Other,
}

impl Module {
    /// Words that identify this module in a knowledge-base heading
    pub fn heading_terms(&self) -> &'static [&'static str] {
        match self {
            Module::Edi => &["edi"],
            Module::Vessel => &["vessel"],
            Module::Container => &["container"],
            Module::Database => &["database"],
            Module::Other => &[],
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Whether management should be pulled into the escalation
    pub fn is_urgent(&self) -> bool {
        matches!(self, Severity::High | Severity::Critical)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Lower bound of the MEDIUM tier
    pub const MEDIUM_THRESHOLD: f64 = 0.4;
    /// Lower bound of the HIGH tier
    pub const HIGH_THRESHOLD: f64 = 0.7;

    pub fn from_score(score: f64) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            ConfidenceLevel::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}
