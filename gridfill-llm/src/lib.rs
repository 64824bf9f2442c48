//! Gridfill LLM - Completion Provider Abstraction
//!
//! Provider-agnostic trait for text completion, the retry-with-backoff
//! adapter that wraps a single call, and concrete provider implementations.
//! Concurrency limiting is NOT here - the adapter is stateless per call and
//! the batch orchestrator owns the in-flight cap.

pub mod providers;
pub mod retry;

pub use providers::openai::OpenAiProvider;
pub use retry::{CompletionAdapter, CompletionFailure, CompletionOutcome};

use async_trait::async_trait;
use gridfill_core::{CompletionError, GridfillResult};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

// ============================================================================
// COMPLETION REQUEST
// ============================================================================

/// One completion request: a resolved prompt, a model identifier, and
/// whether the provider should attach its web-search capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Fully resolved prompt text
    pub prompt: String,
    /// Model identifier (e.g. "gpt-5")
    pub model: String,
    /// Attach the provider's web-search tool to the call
    pub web_search: bool,
}

impl CompletionRequest {
    /// Create a request without web search.
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            web_search: false,
        }
    }

    /// Enable web search on this request.
    pub fn with_web_search(mut self) -> Self {
        self.web_search = true;
        self
    }
}

// ============================================================================
// COMPLETION PROVIDER TRAIT
// ============================================================================

/// Trait for completion providers.
/// Implementations must be thread-safe (Send + Sync).
///
/// A provider performs exactly one external call per `complete` invocation;
/// retries, timeouts, and concurrency limits are layered on top by
/// `CompletionAdapter` and the orchestrator.
///
/// # Example
/// ```ignore
/// struct MyProvider { /* ... */ }
///
/// #[async_trait]
/// impl CompletionProvider for MyProvider {
///     async fn complete(&self, request: &CompletionRequest) -> GridfillResult<String> {
///         // Call the provider API
///     }
///     fn name(&self) -> &str { "my-provider" }
/// }
/// ```
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Perform one completion request and return the raw response text.
    ///
    /// # Returns
    /// * `Ok(String)` - aggregated response text
    /// * `Err(GridfillError::Completion)` - classified per the
    ///   transient/fatal taxonomy on `CompletionError`
    async fn complete(&self, request: &CompletionRequest) -> GridfillResult<String>;

    /// Short provider name used in errors and logs (e.g. "openai").
    fn name(&self) -> &str;
}

// ============================================================================
// MOCK PROVIDER FOR TESTING
// ============================================================================

/// Scripted outcome for the mock provider.
pub type MockOutcome = Result<String, CompletionError>;

/// Mock completion provider for testing.
///
/// Consumes a script of outcomes in order; once the script is exhausted it
/// falls back to a responder closure over the request. The default responder
/// echoes the prompt inside an `<answer>` tag.
pub struct MockCompletionProvider {
    script: Mutex<VecDeque<MockOutcome>>,
    responder: Box<dyn Fn(&CompletionRequest) -> MockOutcome + Send + Sync>,
    delay: Option<std::time::Duration>,
    calls: AtomicUsize,
}

impl MockCompletionProvider {
    /// Create a mock whose responder echoes the prompt inside an answer tag.
    pub fn new() -> Self {
        Self::with_responder(|request| Ok(format!("<answer>{}</answer>", request.prompt)))
    }

    /// Create a mock with a custom responder.
    pub fn with_responder(
        responder: impl Fn(&CompletionRequest) -> MockOutcome + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            responder: Box::new(responder),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue scripted outcomes consumed before the responder kicks in.
    pub fn script(self, outcomes: impl IntoIterator<Item = MockOutcome>) -> Self {
        self.script
            .lock()
            .expect("mock script lock")
            .extend(outcomes);
        self
    }

    /// Sleep for `delay` inside each call (for timeout tests).
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `complete` calls observed.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Default for MockCompletionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, request: &CompletionRequest) -> GridfillResult<String> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.script.lock().expect("mock script lock").pop_front();
        let outcome = scripted.unwrap_or_else(|| (self.responder)(request));
        outcome.map_err(Into::into)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

impl std::fmt::Debug for MockCompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCompletionProvider")
            .field("calls", &self.call_count())
            .finish()
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_echoes_prompt() {
        let provider = MockCompletionProvider::new();
        let request = CompletionRequest::new("hello", "test-model");
        let response = provider.complete(&request).await.unwrap();
        assert_eq!(response, "<answer>hello</answer>");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_script_consumed_in_order() {
        let provider = MockCompletionProvider::new().script([
            Err(CompletionError::RateLimited {
                provider: "mock".to_string(),
                retry_after_ms: 0,
            }),
            Ok("second".to_string()),
        ]);
        let request = CompletionRequest::new("x", "m");
        assert!(provider.complete(&request).await.is_err());
        assert_eq!(provider.complete(&request).await.unwrap(), "second");
        // Script exhausted: responder takes over.
        assert_eq!(
            provider.complete(&request).await.unwrap(),
            "<answer>x</answer>"
        );
    }

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::new("p", "m").with_web_search();
        assert!(request.web_search);
        assert_eq!(request.model, "m");
    }
}
