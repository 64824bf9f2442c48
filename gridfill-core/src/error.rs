//! Error types for Gridfill operations

use thiserror::Error;
use uuid::Uuid;

/// Spreadsheet backend errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Backend unreachable: {reason}")]
    Unavailable { reason: String },

    #[error("Worksheet not found: {worksheet}")]
    WorksheetMissing { worksheet: String },

    #[error("Write to {worksheet} failed: {reason}")]
    WriteFailed { worksheet: String, reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Completion provider errors.
///
/// The transient/fatal split drives the retry adapter: transient errors are
/// retried with backoff, fatal errors fail the call on the first attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompletionError {
    #[error("Rate limited by {provider}, retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: i64,
    },

    #[error("Request to {provider} timed out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("Server error from {provider} (status {status}): {message}")]
    ServerError {
        provider: String,
        status: i32,
        message: String,
    },

    #[error("Invalid API key for {provider}")]
    InvalidApiKey { provider: String },

    #[error("Invalid request to {provider}: {message}")]
    InvalidRequest { provider: String, message: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

impl CompletionError {
    /// Whether the retry adapter should retry this failure.
    ///
    /// Rate limits, timeouts, and 5xx-class failures are transient; auth and
    /// request-shape failures are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimited { .. }
                | CompletionError::Timeout { .. }
                | CompletionError::ServerError { .. }
        )
    }

    /// Short classification label used in cell error markers.
    pub fn class(&self) -> &'static str {
        match self {
            CompletionError::RateLimited { .. } => "rate limited",
            CompletionError::Timeout { .. } => "timeout",
            CompletionError::ServerError { .. } => "server error",
            CompletionError::InvalidApiKey { .. } => "invalid api key",
            CompletionError::InvalidRequest { .. } => "invalid request",
            CompletionError::InvalidResponse { .. } => "invalid response",
        }
    }
}

/// Table and configuration consistency errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown column: {column}")]
    UnknownColumn { column: String },

    #[error("Unknown row: {id}")]
    UnknownRow { id: Uuid },

    #[error("Duplicate row id: {id}")]
    DuplicateRowId { id: Uuid },

    #[error("Duplicate column: {column}")]
    DuplicateColumn { column: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all Gridfill errors.
#[derive(Debug, Clone, Error)]
pub enum GridfillError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Gridfill operations.
pub type GridfillResult<T> = Result<T, GridfillError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(CompletionError::RateLimited {
            provider: "openai".to_string(),
            retry_after_ms: 0,
        }
        .is_transient());
        assert!(CompletionError::Timeout {
            provider: "openai".to_string(),
            timeout_ms: 1000,
        }
        .is_transient());
        assert!(CompletionError::ServerError {
            provider: "openai".to_string(),
            status: 503,
            message: "unavailable".to_string(),
        }
        .is_transient());
    }

    #[test]
    fn test_fatal_classification() {
        assert!(!CompletionError::InvalidApiKey {
            provider: "openai".to_string(),
        }
        .is_transient());
        assert!(!CompletionError::InvalidRequest {
            provider: "openai".to_string(),
            message: "bad field".to_string(),
        }
        .is_transient());
        assert!(!CompletionError::InvalidResponse {
            provider: "openai".to_string(),
            reason: "not json".to_string(),
        }
        .is_transient());
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Unavailable {
            reason: "connection refused".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Backend unreachable"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_completion_error_display_rate_limited() {
        let err = CompletionError::RateLimited {
            provider: "openai".to_string(),
            retry_after_ms: 1500,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Rate limited"));
        assert!(msg.contains("openai"));
        assert!(msg.contains("1500"));
    }

    #[test]
    fn test_gridfill_error_from_variants() {
        let store = GridfillError::from(StoreError::LockPoisoned);
        assert!(matches!(store, GridfillError::Store(_)));

        let completion = GridfillError::from(CompletionError::InvalidApiKey {
            provider: "openai".to_string(),
        });
        assert!(matches!(completion, GridfillError::Completion(_)));

        let validation = GridfillError::from(ValidationError::UnknownColumn {
            column: "summary".to_string(),
        });
        assert!(matches!(validation, GridfillError::Validation(_)));

        let config = GridfillError::from(ConfigError::MissingRequired {
            field: "model".to_string(),
        });
        assert!(matches!(config, GridfillError::Config(_)));
    }

    #[test]
    fn test_error_class_labels() {
        let err = CompletionError::Timeout {
            provider: "openai".to_string(),
            timeout_ms: 10,
        };
        assert_eq!(err.class(), "timeout");
    }
}
