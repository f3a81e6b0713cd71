use std::fmt::Debug;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("AI provider is not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Provider returned {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Failed to parse provider output: {0}")]
    ParseError(String),

    #[error("Provider returned no content")]
    EmptyResponse,
}

/// Inline file sent alongside the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// One completion request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub attachment: Option<Attachment>,
    /// e.g. `application/json` or `text/plain`
    pub response_mime_type: Option<String>,
    /// Provider schema the JSON output must follow
    pub response_schema: Option<Value>,
}

impl GenerateRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn json(prompt: impl Into<String>, schema: Value) -> Self {
        Self {
            prompt: prompt.into(),
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
            ..Default::default()
        }
    }

    pub fn with_attachment(mut self, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.attachment = Some(Attachment {
            mime_type: mime_type.into(),
            data,
        });
        self
    }
}

/// A text/JSON completion service.
#[async_trait]
pub trait GenAiClient: Send + Sync + Debug {
    /// Model identifier, for logging.
    fn model(&self) -> &str;

    /// Run one completion and return the raw text of the first candidate.
    async fn generate(&self, request: GenerateRequest) -> Result<String, GenAiError>;
}

/// Deserialize provider output, tolerating a surrounding markdown code fence.
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, GenAiError> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(body).map_err(|e| GenAiError::ParseError(e.to_string()))
}
