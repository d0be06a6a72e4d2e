//! Gemini-style `generateContent` client.
//!
//! Sends the prompt as a single user turn and asks for JSON output via
//! `generationConfig.responseMimeType`. The text of the first candidate is
//! parsed as the produced object; a surrounding Markdown code fence is
//! tolerated since models add one even when asked not to.
//!
//! See: <https://ai.google.dev/api/generate-content>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::traits::{GenerationBackend, GenerationRequest, ResponseFormat};
use crate::{Result, WanderloreError};

/// Default base URL for the Generative Language API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default request timeout
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for a `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiBackend {
    api_key: String,
    model: String,
    base_url: String,
    temperature: Option<f32>,
    timeout: Duration,
    http: Client,
}

impl GeminiBackend {
    /// Create a client against the public endpoint.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL, DEFAULT_GENERATION_TIMEOUT)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            WanderloreError::Configuration(format!("failed to build HTTP client: {e}"))
        })?;
        Ok(Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            temperature: None,
            timeout,
            http,
        })
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Check response status and map to appropriate error.
    async fn handle_response_errors(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(WanderloreError::AuthenticationFailed)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs);
                Err(WanderloreError::UpstreamRateLimited { retry_after })
            }
            code => {
                let body = response.text().await.unwrap_or_default();
                Err(WanderloreError::Api {
                    status: code.as_u16(),
                    message: format!("generateContent error: {}", body.trim()),
                })
            }
        }
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: match request.response_format {
                    ResponseFormat::Json => "application/json",
                },
                temperature: self.temperature,
            },
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WanderloreError::Timeout(self.timeout)
                } else {
                    WanderloreError::Network(e.to_string())
                }
            })?;
        let response = Self::handle_response_errors(response).await?;

        let raw = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&raw).map_err(|e| {
            WanderloreError::MalformedOutput(format!("unexpected generateContent envelope: {e}"))
        })?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .filter(|text| !text.trim().is_empty())
            .ok_or(WanderloreError::EmptyResponse)?;

        serde_json::from_str(strip_code_fence(&text))
            .map_err(|e| WanderloreError::MalformedOutput(format!("reply is not JSON: {e}")))
    }
}

/// Remove a surrounding ```` ```json ```` fence, if any.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let text = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fence(text), "{\"a\": 1}");
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn endpoint_includes_model() {
        let backend = GeminiBackend::with_base_url(
            "k",
            "gemini-test",
            "http://localhost:1234/",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            backend.endpoint(),
            "http://localhost:1234/v1beta/models/gemini-test:generateContent"
        );
    }
}
