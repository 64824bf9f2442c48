//! Configuration types

use crate::{ConfigError, GridfillResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// RETRY POLICY
// ============================================================================

/// Retry policy for completion calls, as an explicit policy object.
///
/// The wait before attempt `n` is `base_delay * multiplier^(n-1)`, capped at
/// `max_delay`, plus uniform random jitter up to `max_jitter` to avoid
/// thundering-herd retries against the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempt ceiling, including the first attempt
    pub max_attempts: u32,
    /// Initial backoff duration
    pub base_delay: Duration,
    /// Upper bound on the backoff duration
    pub max_delay: Duration,
    /// Exponential growth factor
    pub multiplier: f64,
    /// Upper bound on the random jitter added to each wait
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
            max_jitter: Duration::from_secs(1),
        }
    }
}

// ============================================================================
// ENGINE CONFIG
// ============================================================================

/// Engine configuration for batch runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum simultaneous in-flight completion requests
    pub max_concurrent_requests: usize,
    /// Per-call timeout, independent of the retry budget
    pub request_timeout: Duration,
    /// Model identifier used when a call does not specify one
    pub default_model: String,
    /// Retry policy applied by the completion adapter
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 5,
            request_timeout: Duration::from_secs(120),
            default_model: "gpt-5".to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `GRIDFILL_MAX_CONCURRENT_REQUESTS`: in-flight request cap (default: 5)
    /// - `GRIDFILL_REQUEST_TIMEOUT_SECS`: per-call timeout (default: 120)
    /// - `GRIDFILL_DEFAULT_MODEL`: default model identifier (default: "gpt-5")
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_concurrent_requests: std::env::var("GRIDFILL_MAX_CONCURRENT_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_concurrent_requests),
            request_timeout: std::env::var("GRIDFILL_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            default_model: std::env::var("GRIDFILL_DEFAULT_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.default_model),
            retry: defaults.retry,
        }
    }

    /// Validate the configuration.
    /// Returns Ok(()) if valid, Err(GridfillError::Config) if invalid.
    ///
    /// Validates:
    /// - max_concurrent_requests > 0
    /// - request_timeout is positive
    /// - retry.max_attempts > 0
    /// - retry.multiplier > 0
    /// - retry.max_delay >= retry.base_delay
    pub fn validate(&self) -> GridfillResult<()> {
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrent_requests".to_string(),
                value: "0".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout".to_string(),
                value: format!("{:?}", self.request_timeout),
                reason: "must be positive".to_string(),
            }
            .into());
        }

        if self.default_model.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "default_model".to_string(),
            }
            .into());
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_attempts".to_string(),
                value: "0".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.retry.multiplier <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.multiplier".to_string(),
                value: self.retry.multiplier.to_string(),
                reason: "must be positive".to_string(),
            }
            .into());
        }

        if self.retry.max_delay < self.retry.base_delay {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_delay".to_string(),
                value: format!("{:?}", self.retry.max_delay),
                reason: "must be at least base_delay".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
