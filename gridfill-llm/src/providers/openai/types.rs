//! OpenAI Responses API request/response types

use serde::{Deserialize, Serialize};

/// Request body for the Responses API.
#[derive(Debug, Clone, Serialize)]
pub struct ResponsesRequest {
    pub model: String,
    pub input: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
}

/// Tool attachment for a request (web search is the only one used here).
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    #[serde(rename = "type")]
    pub tool_type: String,
}

impl ToolSpec {
    /// The web-search tool attached when a column asks for it.
    pub fn web_search() -> Self {
        Self {
            tool_type: "web_search_preview".to_string(),
        }
    }
}

/// Response body from the Responses API.
///
/// Newer API versions expose the aggregated `output_text`; older shapes only
/// carry structured output items, which the provider reassembles.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsesResponse {
    #[serde(default)]
    pub output_text: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputItem>,
}

/// One output item in a structured response.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputItem {
    #[serde(default)]
    pub content: Vec<ContentPiece>,
}

/// One content piece carrying text.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentPiece {
    #[serde(default)]
    pub text: Option<String>,
}

/// Error envelope returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// Error detail inside the envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}

// ============================================================================
// TESTS
// ============================================================================
