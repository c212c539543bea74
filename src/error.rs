use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Incident text was empty or whitespace-only
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A corpus collaborator could not supply its data
    #[error("Corpus unavailable ({source_name}): {message}")]
    MissingCorpus { source_name: String, message: String },

    /// A sub-search exceeded its time budget
    #[error("Search over {source_name} timed out after {timeout_ms}ms")]
    SearchTimeout { source_name: String, timeout_ms: u64 },

    /// No corpus at all could be reached when the gatherer was built
    #[error("No corpus available: {0}")]
    CorpusUnavailable(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Build a `MissingCorpus` error for the named source
    pub fn missing_corpus(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::MissingCorpus {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::MissingCorpus { .. } => "MISSING_CORPUS",
            AppError::SearchTimeout { .. } => "SEARCH_TIMEOUT",
            AppError::CorpusUnavailable(_) => "CORPUS_UNAVAILABLE",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller can act on this error (bad input or nothing to search)
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            AppError::InvalidInput(_) | AppError::CorpusUnavailable(_)
        )
    }
}

/// Conversion from serde_json::Error
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Conversion from serde_yaml::Error
impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Conversion from validator::ValidationErrors
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
