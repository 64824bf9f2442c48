//! CompletionProvider implementation over the Responses API

use super::client::OpenAiClient;
use super::types::{ResponsesRequest, ResponsesResponse, ToolSpec};
use crate::{CompletionProvider, CompletionRequest};
use async_trait::async_trait;
use gridfill_core::{CompletionError, ConfigError, GridfillResult};

/// OpenAI completion provider.
pub struct OpenAiProvider {
    client: OpenAiClient,
}

impl OpenAiProvider {
    /// Default requests-per-minute cap for the underlying client.
    pub const DEFAULT_RPM: u32 = 60;

    /// Create a provider with an explicit API key.
    pub fn new(api_key: impl Into<String>, requests_per_minute: u32) -> Self {
        Self {
            client: OpenAiClient::new(api_key, requests_per_minute),
        }
    }

    /// Create a provider from the `OPENAI_API_KEY` environment variable.
    ///
    /// # Returns
    /// * `Err(GridfillError::Config)` - if the variable is unset or blank
    pub fn from_env() -> GridfillResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingRequired {
                field: "OPENAI_API_KEY".to_string(),
            })?;
        Ok(Self::new(api_key, Self::DEFAULT_RPM))
    }

    /// Wrap an already-configured client (for gateway URLs and tests).
    pub fn with_client(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, request: &CompletionRequest) -> GridfillResult<String> {
        let tools = if request.web_search {
            vec![ToolSpec::web_search()]
        } else {
            vec![]
        };

        let body = ResponsesRequest {
            model: request.model.clone(),
            input: request.prompt.clone(),
            tools,
        };

        let response: ResponsesResponse = self.client.request("responses", body).await?;
        response_text(&response).ok_or_else(|| {
            CompletionError::InvalidResponse {
                provider: self.name().to_string(),
                reason: "response carried no text output".to_string(),
            }
            .into()
        })
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Extract plain text from a Responses API result.
///
/// Prefers the aggregated `output_text`, then reassembles from output
/// content pieces joined with newlines.
fn response_text(response: &ResponsesResponse) -> Option<String> {
    if let Some(text) = &response.output_text {
        if !text.trim().is_empty() {
            return Some(text.clone());
        }
    }

    let parts: Vec<&str> = response
        .output
        .iter()
        .flat_map(|item| item.content.iter())
        .filter_map(|piece| piece.text.as_deref())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("client", &self.client)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ResponsesResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_response_text_prefers_output_text() {
        let response = parse(r#"{"output_text": "direct", "output": [{"content": [{"text": "parts"}]}]}"#);
        assert_eq!(response_text(&response).as_deref(), Some("direct"));
    }

    #[test]
    fn test_response_text_reassembles_parts() {
        let response = parse(
            r#"{"output": [{"content": [{"text": "one"}, {"text": "two"}]}, {"content": [{"text": "three"}]}]}"#,
        );
        assert_eq!(response_text(&response).as_deref(), Some("one\ntwo\nthree"));
    }

    #[test]
    fn test_response_text_blank_output_text_falls_back() {
        let response = parse(r#"{"output_text": "  ", "output": [{"content": [{"text": "real"}]}]}"#);
        assert_eq!(response_text(&response).as_deref(), Some("real"));
    }

    #[test]
    fn test_response_text_none_when_empty() {
        let response = parse(r#"{"output": []}"#);
        assert!(response_text(&response).is_none());
    }
}
