//! Retry-with-backoff adapter around a single completion call

use crate::{CompletionProvider, CompletionRequest};
use gridfill_core::{CompletionError, GridfillError, RetryPolicy};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Successful adapter outcome: the response text and the retries consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    /// Raw response text from the provider
    pub text: String,
    /// Retries consumed (0 when the first attempt succeeded)
    pub retries: u32,
}

/// Terminal adapter failure: the final error and the retries consumed
/// before giving up (0 for fatal first-attempt failures).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionFailure {
    /// The final classified error
    pub error: CompletionError,
    /// Retries consumed before giving up
    pub retries: u32,
}

impl std::fmt::Display for CompletionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (after {} retries)", self.error, self.retries)
    }
}

impl std::error::Error for CompletionFailure {}

/// Wraps a provider with a per-call timeout and an explicit retry policy.
///
/// Transient failures (rate limit, timeout, 5xx) are retried up to the
/// policy's attempt ceiling with exponentially growing, jittered waits.
/// Fatal failures return immediately. The adapter holds no per-call state;
/// one instance is shared across a whole batch run.
pub struct CompletionAdapter {
    provider: Arc<dyn CompletionProvider>,
    policy: RetryPolicy,
    request_timeout: Duration,
}

impl CompletionAdapter {
    /// Create an adapter around a provider.
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        policy: RetryPolicy,
        request_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            policy,
            request_timeout,
        }
    }

    /// Perform one completion with timeout and retries.
    ///
    /// # Returns
    /// * `Ok(CompletionOutcome)` - response text plus retries consumed
    /// * `Err(CompletionFailure)` - the final error after retry exhaustion
    ///   (or the first fatal error), plus retries consumed
    pub async fn execute(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionOutcome, CompletionFailure> {
        let mut attempt: u32 = 1;
        loop {
            let result = match tokio::time::timeout(
                self.request_timeout,
                self.provider.complete(request),
            )
            .await
            {
                Ok(result) => result.map_err(|e| self.classify(e)),
                Err(_) => Err(CompletionError::Timeout {
                    provider: self.provider.name().to_string(),
                    timeout_ms: self.request_timeout.as_millis() as u64,
                }),
            };

            match result {
                Ok(text) => {
                    return Ok(CompletionOutcome {
                        text,
                        retries: attempt - 1,
                    })
                }
                Err(error) if error.is_transient() && attempt < self.policy.max_attempts => {
                    let wait = backoff_delay(&self.policy, attempt);
                    tracing::debug!(
                        provider = self.provider.name(),
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        error = %error,
                        "transient completion failure, backing off"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(error) => {
                    return Err(CompletionFailure {
                        error,
                        retries: attempt - 1,
                    })
                }
            }
        }
    }

    /// Providers report completion errors; anything else that leaks out is
    /// treated as a fatal invalid response.
    fn classify(&self, error: GridfillError) -> CompletionError {
        match error {
            GridfillError::Completion(error) => error,
            other => CompletionError::InvalidResponse {
                provider: self.provider.name().to_string(),
                reason: other.to_string(),
            },
        }
    }
}

/// Wait before the retry following attempt `attempt` (1-based):
/// `min(max_delay, base_delay * multiplier^(attempt-1))` plus uniform
/// random jitter in `[0, max_jitter)`.
fn backoff_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    let grown = policy.base_delay.as_secs_f64() * policy.multiplier.powi(exponent as i32);
    let capped = grown.min(policy.max_delay.as_secs_f64());
    let jitter = if policy.max_jitter.is_zero() {
        0.0
    } else {
        rand::rng().random_range(0.0..policy.max_jitter.as_secs_f64())
    };
    Duration::from_secs_f64(capped + jitter)
}

impl std::fmt::Debug for CompletionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionAdapter")
            .field("provider", &self.provider.name())
            .field("policy", &self.policy)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
