//! Gemini generation client
//!
//! Calls `models/{model}:generateContent` with the key in `x-goog-api-key`.
//! HTTP failures map onto `GenerationErrorKind` (auth, quota, timeout, upstream).

use async_trait::async_trait;
use qc_core::{GenerationErrorKind, QcError};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::generation::{GenerationRequest, GenerationService};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Gemini `generateContent` client.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_endpoint(api_key, DEFAULT_BASE_URL.to_string(), DEFAULT_MODEL.to_string())
    }

    pub fn with_endpoint(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            model,
            api_key,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn complete(&self, request: &GenerationRequest) -> Result<String, QcError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.sampling.temperature,
                top_p: request.sampling.top_p,
                max_output_tokens: request.sampling.max_output_tokens,
            },
        };

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .timeout(request.timeout)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(status_error(status, &text));
        }

        let parsed: GenerateContentResponse = resp.json().await.map_err(|e| {
            QcError::generation(GenerationErrorKind::Upstream, format!("undecodable response: {e}"))
        })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(QcError::generation(
                GenerationErrorKind::Upstream,
                "empty completion",
            ));
        }
        Ok(text)
    }
}

fn transport_error(e: reqwest::Error) -> QcError {
    if e.is_timeout() {
        QcError::generation(GenerationErrorKind::Timeout, format!("request timed out: {e}"))
    } else {
        QcError::generation(GenerationErrorKind::Upstream, format!("HTTP error: {e}"))
    }
}

/// Gemini reports a bad key as 400 with reason API_KEY_INVALID.
pub(crate) fn status_error(status: StatusCode, body: &str) -> QcError {
    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationErrorKind::Auth,
        StatusCode::BAD_REQUEST if body.contains("API_KEY_INVALID") => GenerationErrorKind::Auth,
        StatusCode::TOO_MANY_REQUESTS => GenerationErrorKind::Quota,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GenerationErrorKind::Timeout,
        _ => GenerationErrorKind::Upstream,
    };
    QcError::generation(kind, format!("HTTP {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(err: QcError) -> GenerationErrorKind {
        match err {
            QcError::GenerationService { kind, .. } => kind,
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(kind(status_error(StatusCode::UNAUTHORIZED, "")), GenerationErrorKind::Auth);
        assert_eq!(
            kind(status_error(StatusCode::BAD_REQUEST, r#"{"reason":"API_KEY_INVALID"}"#)),
            GenerationErrorKind::Auth
        );
        assert_eq!(kind(status_error(StatusCode::TOO_MANY_REQUESTS, "")), GenerationErrorKind::Quota);
        assert_eq!(kind(status_error(StatusCode::GATEWAY_TIMEOUT, "")), GenerationErrorKind::Timeout);
        assert_eq!(
            kind(status_error(StatusCode::INTERNAL_SERVER_ERROR, "")),
            GenerationErrorKind::Upstream
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part { text: "hi".into() }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.3,
                top_p: 0.85,
                max_output_tokens: 512,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 512);
        assert!(json["generationConfig"]["topP"].is_number());
    }
}
