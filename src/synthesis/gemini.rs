//! Gemini `generateContent` client.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{build_prompt, truncate_transcript, ContentGenerator, OutputLanguage, SynthesisError};
use crate::config::SynthesisConfig;
use crate::{ConverterError, Result};

/// Gemini API client for content generation.
pub struct GeminiClient {
    client: Client,
    api_base: String,
    model: String,
    max_transcript_chars: usize,
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(config: &SynthesisConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_transcript_chars: config.max_transcript_chars,
        })
    }

    async fn call_gemini_api(&self, prompt: String, api_key: &str) -> std::result::Result<String, SynthesisError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.api_base, self.model);

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SynthesisError::Upstream(format!("Gemini API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, error_text));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            SynthesisError::Upstream(format!("Failed to parse Gemini response: {}", e))
        })?;

        gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<String>()
            })
            .filter(|text| !text.is_empty())
            .ok_or_else(|| SynthesisError::Upstream("No content in Gemini response".to_string()))
    }
}

/// Invalid keys come back as 400 with `API_KEY_INVALID`, revoked ones as 401/403
fn classify_failure(status: StatusCode, body: String) -> SynthesisError {
    let key_rejected = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || (status == StatusCode::BAD_REQUEST
            && (body.contains("API_KEY_INVALID") || body.contains("API key not valid")));

    if key_rejected {
        SynthesisError::Auth {
            status: status.as_u16(),
            message: body,
        }
    } else {
        SynthesisError::Upstream(format!("Gemini API returned {}: {}", status, body))
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate(&self, transcript: &str, api_key: &str, language: OutputLanguage) -> Result<String> {
        let excerpt = truncate_transcript(transcript, self.max_transcript_chars);
        if excerpt.len() < transcript.len() {
            tracing::info!(
                "Transcript truncated to {} characters before generation",
                self.max_transcript_chars
            );
        }

        tracing::info!("Generating {} content with {}", language, self.model);
        let prompt = build_prompt(excerpt, language);

        let text = self
            .call_gemini_api(prompt, api_key)
            .await
            .map_err(ConverterError::Synthesis)?;

        tracing::info!("Received {} characters from {}", text.chars().count(), self.model);
        Ok(text)
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn client(server: &MockServer) -> GeminiClient {
        let config = SynthesisConfig {
            api_base: server.uri(),
            ..SynthesisConfig::default()
        };
        GeminiClient::new(&config).unwrap()
    }

    fn reply(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }], "role": "model" },
                "finishReason": "STOP"
            }]
        })
    }

    fn synthesis_error(err: &anyhow::Error) -> &SynthesisError {
        match err.downcast_ref::<ConverterError>() {
            Some(ConverterError::Synthesis(inner)) => inner,
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_returns_text_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "secret-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("# Title\n\nBody")))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server)
            .generate("WEBVTT\n\nhello", "secret-key", OutputLanguage::English)
            .await
            .unwrap();

        assert_eq!(text, "# Title\n\nBody");
    }

    #[tokio::test]
    async fn test_generate_embeds_only_first_80000_chars() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("ok")))
            .mount(&server)
            .await;

        let transcript = format!("{}TAILMARKER", "x".repeat(80_000));
        client(&server)
            .generate(&transcript, "key", OutputLanguage::Korean)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();

        assert!(prompt.contains(&"x".repeat(80_000)));
        assert!(!prompt.contains(&"x".repeat(80_001)));
        assert!(!prompt.contains("TAILMARKER"));
        assert!(prompt.contains("Target Language: Korean"));
    }

    #[tokio::test]
    async fn test_invalid_key_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT",
                    "details": [{ "reason": "API_KEY_INVALID" }]
                }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate("text", "bad-key", OutputLanguage::English)
            .await
            .unwrap_err();

        assert!(matches!(synthesis_error(&err), SynthesisError::Auth { status: 400, .. }));
        assert!(err.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_quota_error_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("RESOURCE_EXHAUSTED"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server)
            .generate("text", "key", OutputLanguage::English)
            .await
            .unwrap_err();

        match synthesis_error(&err) {
            SynthesisError::Upstream(message) => assert!(message.contains("RESOURCE_EXHAUSTED")),
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate("text", "key", OutputLanguage::English)
            .await
            .unwrap_err();

        assert!(matches!(synthesis_error(&err), SynthesisError::Upstream(_)));
    }

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, String::new()),
            SynthesisError::Auth { status: 403, .. }
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, "prompt too long".to_string()),
            SynthesisError::Upstream(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::INTERNAL_SERVER_ERROR, String::new()),
            SynthesisError::Upstream(_)
        ));
    }
}
