use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Ranking limits and scoring constants
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Fan-out/fan-in behaviour of the context gatherer
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Where the binary loads corpora from
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        let config: Config = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: INCIDENT_CTX_)
            .add_source(
                config::Environment::with_prefix("INCIDENT_CTX")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section that carries constraints
    pub fn validate(&self) -> Result<()> {
        self.retrieval.validate()?;
        self.aggregation.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RetrievalConfig {
    /// Maximum log lines in a bundle (merged across all services)
    #[validate(range(min = 1))]
    #[serde(default = "default_log_top_k")]
    pub log_top_k: usize,

    /// Maximum historical cases in a bundle
    #[validate(range(min = 1))]
    #[serde(default = "default_case_top_n")]
    pub case_top_n: usize,

    /// Maximum knowledge-base passages in a bundle
    #[validate(range(min = 1))]
    #[serde(default = "default_kb_top_m")]
    pub kb_top_m: usize,

    /// Log weight for an exact entity hit
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_w_entity")]
    pub w_entity: f64,

    /// Log weight for a classification keyword hit
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_w_keyword")]
    pub w_keyword: f64,

    /// Log weight for generic token overlap with the incident text
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_w_token")]
    pub w_token: f64,

    /// Case weight for token overlap
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Case weight for an entity literally present in the case
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_beta")]
    pub beta: f64,

    /// Case weight for a module match
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_gamma")]
    pub gamma: f64,

    /// KB weight per distinct matched term
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_kb_term_weight")]
    pub kb_term_weight: f64,

    /// KB bonus when a heading names the module or incident type
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_kb_heading_bonus")]
    pub kb_heading_bonus: f64,

    /// Raw KB score that maps to 1.0
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_kb_max_raw_score")]
    pub kb_max_raw_score: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            log_top_k: default_log_top_k(),
            case_top_n: default_case_top_n(),
            kb_top_m: default_kb_top_m(),
            w_entity: default_w_entity(),
            w_keyword: default_w_keyword(),
            w_token: default_w_token(),
            alpha: default_alpha(),
            beta: default_beta(),
            gamma: default_gamma(),
            kb_term_weight: default_kb_term_weight(),
            kb_heading_bonus: default_kb_heading_bonus(),
            kb_max_raw_score: default_kb_max_raw_score(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AggregationConfig {
    /// Run the three searches concurrently
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Budget for each sub-search (milliseconds)
    #[validate(range(min = 1))]
    #[serde(default = "default_search_timeout_ms")]
    pub search_timeout_ms: u64,

    /// Bundle cache TTL (seconds, 0 disables the cache)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Append management contacts for HIGH/CRITICAL incidents
    #[serde(default = "default_true")]
    pub escalate_management: bool,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            search_timeout_ms: default_search_timeout_ms(),
            cache_ttl_secs: default_cache_ttl(),
            escalate_management: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorpusConfig {
    /// Directory holding one `<service>.log` file per service
    pub logs_dir: Option<PathBuf>,

    /// Exported case log (JSON or YAML)
    pub cases_path: Option<PathBuf>,

    /// Exported knowledge-base passages (JSON or YAML)
    pub kb_path: Option<PathBuf>,

    /// Exported escalation contacts (JSON or YAML)
    pub contacts_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
            prometheus_enabled: true,
        }
    }
}

// Default value functions
fn default_log_top_k() -> usize {
    20
}

fn default_case_top_n() -> usize {
    5
}

fn default_kb_top_m() -> usize {
    5
}

fn default_w_entity() -> f64 {
    3.0
}

fn default_w_keyword() -> f64 {
    1.5
}

fn default_w_token() -> f64 {
    0.5
}

fn default_alpha() -> f64 {
    0.5
}

fn default_beta() -> f64 {
    0.3
}

fn default_gamma() -> f64 {
    0.2
}

fn default_kb_term_weight() -> f64 {
    1.0
}

fn default_kb_heading_bonus() -> f64 {
    2.0
}

fn default_kb_max_raw_score() -> f64 {
    6.0
}

fn default_search_timeout_ms() -> u64 {
    2000
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "llm-incident-context".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.retrieval.log_top_k, 20);
        assert_eq!(config.retrieval.case_top_n, 5);
        assert_eq!(config.aggregation.search_timeout_ms, 2000);
        assert!(config.aggregation.parallel);
        assert_eq!(config.observability.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_embedded_defaults_parse() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.retrieval.kb_top_m, 5);
        assert_eq!(config.retrieval.w_entity, 3.0);
        assert_eq!(config.aggregation.cache_ttl_secs, 300);
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let mut config = Config::default();
        config.retrieval.case_top_n = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_weight_rejected() {
        let mut config = Config::default();
        config.retrieval.gamma = 0.0;
        assert!(config.validate().is_err());
    }
}
