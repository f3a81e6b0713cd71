//! Gemini `generateContent` REST client.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use super::client::{GenAiClient, GenAiError, GenerateRequest};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    /// base64
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    #[serde(default)]
    message: String,
}

impl From<GenerateRequest> for GeminiRequest {
    fn from(request: GenerateRequest) -> Self {
        let mut parts = Vec::with_capacity(2);
        if let Some(attachment) = request.attachment {
            parts.push(Part {
                inline_data: Some(InlineData {
                    mime_type: attachment.mime_type,
                    data: STANDARD.encode(attachment.data),
                }),
                ..Default::default()
            });
        }
        parts.push(Part {
            text: Some(request.prompt),
            ..Default::default()
        });

        let generation_config = if request.response_mime_type.is_some() || request.response_schema.is_some() {
            Some(GenerationConfig {
                response_mime_type: request.response_mime_type,
                response_schema: request.response_schema,
            })
        } else {
            None
        };

        GeminiRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config,
        }
    }
}

impl GeminiResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Result<String, GenAiError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenAiError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Client for the Gemini REST API.
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GeminiClient {
    /// A missing key is reported on first use, so the server can start without one.
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Result<Self, GenAiError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GenAiError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenAiClient for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn generate(&self, request: GenerateRequest) -> Result<String, GenAiError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenAiError::NotConfigured("GENAI_API_KEY is not set".to_string()))?;

        debug!(
            "Sending prompt of {} chars (attachment: {})",
            request.prompt.len(),
            request.attachment.is_some()
        );
        let body = GeminiRequest::from(request);

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Request to AI provider failed: {}", e);
                GenAiError::NetworkError(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorBody>(&raw)
                .map(|b| b.error.message)
                .unwrap_or(raw);
            warn!("AI provider returned {}: {}", status, message);
            return Err(GenAiError::RequestFailed {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenAiError::ParseError(e.to_string()))?;
        parsed.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_format() {
        let request = GenerateRequest::json("List products", json!({"type": "STRING"}))
            .with_attachment("application/pdf", b"%PDF".to_vec());
        let wire = serde_json::to_value(GeminiRequest::from(request)).unwrap();

        assert_eq!(wire["contents"][0]["role"], "user");
        assert_eq!(wire["contents"][0]["parts"][0]["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(wire["contents"][0]["parts"][0]["inlineData"]["data"], "JVBERg==");
        assert_eq!(wire["contents"][0]["parts"][1]["text"], "List products");
        assert_eq!(wire["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(wire["generationConfig"]["responseSchema"]["type"], "STRING");
    }

    #[test]
    fn test_plain_request_has_no_generation_config() {
        let wire = serde_json::to_value(GeminiRequest::from(GenerateRequest::text("hello"))).unwrap();
        assert!(wire.get("generationConfig").is_none());
        assert_eq!(wire["contents"][0]["parts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_response_text_joins_parts_of_first_candidate() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Hello, "}, {"text": "world"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "Hello, world");
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        let response: GeminiResponse = serde_json::from_value(json!({"candidates": []})).unwrap();
        assert!(matches!(response.into_text(), Err(GenAiError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_request() {
        let client = GeminiClient::new("http://127.0.0.1:9", "gemini-test", Some("  ".to_string())).unwrap();
        let err = client.generate(GenerateRequest::text("hi")).await.unwrap_err();
        assert!(matches!(err, GenAiError::NotConfigured(_)));
        assert_eq!(client.model(), "gemini-test");
    }
}
