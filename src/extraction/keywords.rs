//! Keyword-weight tables driving classification and severity

use crate::models::{IncidentType, Module, Severity};

/// A keyword (lower-case, may be a phrase) and the weight a hit adds
pub type WeightedKeyword = (&'static str, f64);

/// Module tables in tie-break priority order
pub static MODULE_KEYWORDS: &[(Module, &[WeightedKeyword])] = &[
    (
        Module::Edi,
        &[
            ("edi", 3.0),
            ("edifact", 3.0),
            ("codeco", 2.5),
            ("baplie", 2.5),
            ("coarri", 2.5),
            ("coprar", 2.5),
            ("iftmin", 2.5),
            ("message", 1.0),
            ("ack", 1.0),
            ("acknowledgement", 1.0),
            ("api", 1.0),
        ],
    ),
    (
        Module::Vessel,
        &[
            ("vessel", 3.0),
            ("ship", 2.0),
            ("berth", 2.0),
            ("mv", 2.0),
            ("voyage", 2.0),
            ("arrival", 1.0),
            ("departure", 1.0),
            ("eta", 1.0),
            ("etb", 1.0),
        ],
    ),
    (
        Module::Container,
        &[
            ("container", 3.0),
            ("cntr", 2.5),
            ("teu", 1.5),
            ("gate in", 1.5),
            ("gate out", 1.5),
            ("yard", 1.0),
        ],
    ),
    (
        Module::Database,
        &[
            ("database", 3.0),
            ("db", 2.5),
            ("sql", 2.5),
            ("query", 1.5),
            ("table", 1.0),
            ("deadlock", 2.0),
            ("null", 0.5),
        ],
    ),
];

/// Incident type tables in tie-break priority order
pub static TYPE_KEYWORDS: &[(IncidentType, &[WeightedKeyword])] = &[
    (
        IncidentType::DuplicateEntry,
        &[
            ("duplicate", 3.0),
            ("two identical", 3.0),
            ("already exists", 2.0),
            ("double", 1.5),
        ],
    ),
    (
        IncidentType::StuckProcess,
        &[
            ("stuck", 3.0),
            ("error status", 2.5),
            ("not acknowledged", 2.5),
            ("is null", 1.5),
            ("not processed", 2.0),
            ("pending", 1.0),
            ("hang", 1.5),
        ],
    ),
    (
        IncidentType::Timeout,
        &[
            ("timeout", 3.0),
            ("timed out", 3.0),
            ("not responding", 2.0),
            ("slow", 1.0),
            ("latency", 1.0),
        ],
    ),
    (
        IncidentType::ErrorStatus,
        &[
            ("error", 1.0),
            ("failed", 1.5),
            ("failure", 1.5),
            ("cannot", 1.5),
            ("unable to", 1.5),
            ("exception", 1.5),
            ("rejected", 1.5),
            ("err", 1.0),
        ],
    ),
];

/// Severity cues, checked from the most severe tier down
pub static SEVERITY_CUES: &[(Severity, &[&str])] = &[
    (
        Severity::Critical,
        &[
            "critical",
            "urgent",
            "production down",
            "outage",
            "all customers",
            "immediately",
            "system down",
        ],
    ),
    (
        Severity::High,
        &[
            "high priority",
            "multiple",
            "affecting customers",
            "business impact",
            "down",
            "blocked",
        ],
    ),
    (
        Severity::Low,
        &["minor", "low priority", "cosmetic", "display only"],
    ),
];

/// Error-code prefixes that point at a module
pub static ERROR_PREFIX_MODULES: &[(&str, Module)] = &[
    ("EDI", Module::Edi),
    ("API", Module::Edi),
    ("VESSEL", Module::Vessel),
    ("BERTH", Module::Vessel),
    ("CNTR", Module::Container),
    ("CONTAINER", Module::Container),
    ("DB", Module::Database),
    ("SQL", Module::Database),
];

/// Weight added to a module per structural entity that implies it
pub const ENTITY_MODULE_WEIGHT: f64 = 2.0;

/// Weight added to `error_status` per extracted error code
pub const ERROR_CODE_TYPE_WEIGHT: f64 = 1.0;

/// Criticality a module carries before any severity cue is considered
pub fn module_baseline(module: Module) -> Severity {
    match module {
        Module::Edi => Severity::Medium,
        Module::Vessel => Severity::High,
        Module::Container => Severity::Medium,
        Module::Database => Severity::High,
        Module::Other => Severity::Low,
    }
}

/// The full set of tables an extractor classifies with
#[derive(Debug, Clone, Copy)]
pub struct ClassificationTables {
    pub modules: &'static [(Module, &'static [WeightedKeyword])],
    pub incident_types: &'static [(IncidentType, &'static [WeightedKeyword])],
    pub severity_cues: &'static [(Severity, &'static [&'static str])],
    pub error_prefixes: &'static [(&'static str, Module)],
}

impl Default for ClassificationTables {
    fn default() -> Self {
        Self {
            modules: MODULE_KEYWORDS,
            incident_types: TYPE_KEYWORDS,
            severity_cues: SEVERITY_CUES,
            error_prefixes: ERROR_PREFIX_MODULES,
        }
    }
}
