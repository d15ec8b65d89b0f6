//! Error types for the ENIAD gateway

use thiserror::Error;

/// Result type alias using EniadError
pub type Result<T> = std::result::Result<T, EniadError>;

/// Error type alias for convenience
pub type Error = EniadError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const ENGINE_UNAVAILABLE: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for the gateway
#[derive(Debug, Error)]
pub enum EniadError {
    /// Required credential or endpoint missing. Non-retryable: the affected
    /// adapter stays unavailable for the process lifetime.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout, connection refused, 5xx. Triggers the next fallback tier.
    #[error("Engine '{engine}' unreachable: {reason}")]
    Transient { engine: String, reason: String },

    /// 2xx response whose payload is missing required fields. Treated like a
    /// transient failure for routing purposes.
    #[error("Semantically invalid response from '{engine}': {reason}")]
    Semantic { engine: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EniadError {
    /// Build a transient-network error for an engine
    pub fn transient(engine: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transient {
            engine: engine.into(),
            reason: reason.into(),
        }
    }

    /// Build a semantic (malformed success) error for an engine
    pub fn semantic(engine: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Semantic {
            engine: engine.into(),
            reason: reason.into(),
        }
    }

    /// True when the error should trigger the next fallback tier instead of
    /// being surfaced to the caller.
    pub fn is_tier_fallthrough(&self) -> bool {
        matches!(
            self,
            Self::Transient { .. } | Self::Semantic { .. } | Self::Http(_)
        )
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::InvalidInput(_) => exit_codes::INVALID_INPUT,
            Self::Transient { .. } | Self::Http(_) => exit_codes::ENGINE_UNAVAILABLE,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_fallthrough_classification() {
        assert!(EniadError::transient("rag-backend", "timeout").is_tier_fallthrough());
        assert!(EniadError::semantic("rag-backend", "missing 'answer'").is_tier_fallthrough());
        assert!(!EniadError::Config("no api key".into()).is_tier_fallthrough());
        assert!(!EniadError::InvalidInput("bad kind".into()).is_tier_fallthrough());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            EniadError::Config("x".into()).exit_code(),
            exit_codes::INVALID_INPUT
        );
        assert_eq!(
            EniadError::transient("sma", "refused").exit_code(),
            exit_codes::ENGINE_UNAVAILABLE
        );
    }
}
