//! LLM Client: the single point of entry for all model API calls.
//!
//! Talks to the Gemini `generateContent` endpoint. One request per call;
//! failures are surfaced immediately, never retried.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

pub mod parse;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Model API did not respond within {secs}s")]
    Timeout { secs: u64 },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response body from model API: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn single_text(prompt: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

/// Raw `generateContent` response. Every level is optional so that a missing
/// field surfaces as a parse error in [`parse`], not as a decode failure here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
pub struct ContentPart {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// The model client shared by all requests.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout_secs: u64,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.model_timeout_secs))
            .build()
            .map_err(LlmError::Http)?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.model_api_base_url, config.model_id
            ),
            api_key: config.model_api_key.clone(),
            timeout_secs: config.model_timeout_secs,
        })
    }

    /// Sends `prompt` as a single text part and returns the decoded envelope.
    pub async fn generate_content(
        &self,
        prompt: &str,
    ) -> Result<GenerateContentResponse, LlmError> {
        let request_body = GenerateContentRequest::single_text(prompt);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!(bytes = body.len(), "Model API responded");

        Ok(serde_json::from_str(&body)?)
    }

    // reqwest includes the request URL in its messages, and ours carries the key.
    fn transport_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            LlmError::Http(err.without_url())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_config;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    #[test]
    fn test_request_envelope_has_single_text_part() {
        let request = GenerateContentRequest::single_text("hello");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({"contents": [{"parts": [{"text": "hello"}]}]}));
    }

    #[test]
    fn test_response_envelope_decodes_camel_case_usage() {
        let body = json!({
            "candidates": [{"content": {"parts": [{"text": "{}"}], "role": "model"}}],
            "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 3, "totalTokenCount": 10}
        });
        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.candidates.len(), 1);
        assert_eq!(
            response.usage_metadata,
            Some(UsageMetadata {
                prompt_token_count: 7,
                candidates_token_count: 3,
                total_token_count: 10,
            })
        );
    }

    #[tokio::test]
    async fn test_generate_content_posts_envelope_with_key_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/test-model:generateContent")
                    .query_param("key", "test-key")
                    .json_body(json!({"contents": [{"parts": [{"text": "the prompt"}]}]}));
                then.status(200).json_body(json!({
                    "candidates": [{"content": {"parts": [{"text": "answer"}]}}]
                }));
            })
            .await;

        let client = LlmClient::new(&test_config(&server.base_url(), 5)).unwrap();
        let response = client.generate_content("the prompt").await.unwrap();

        mock.assert_hits_async(1).await;
        assert_eq!(response.candidates.len(), 1);
        assert!(response.usage_metadata.is_none());
    }

    #[tokio::test]
    async fn test_non_success_status_uses_gemini_error_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(400).json_body(json!({
                    "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
                }));
            })
            .await;

        let client = LlmClient::new(&test_config(&server.base_url(), 5)).unwrap();
        let err = client.generate_content("prompt").await.unwrap_err();

        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).body("not json at all");
            })
            .await;

        let client = LlmClient::new(&test_config(&server.base_url(), 5)).unwrap();
        let err = client.generate_content("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::Decode(_)));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .json_body(json!({"candidates": []}));
            })
            .await;

        let client = LlmClient::new(&test_config(&server.base_url(), 1)).unwrap();
        let err = client.generate_content("prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout { secs: 1 }));
    }

    #[tokio::test]
    async fn test_connection_refused_message_does_not_leak_key() {
        // Port 1 is reserved and nothing listens on it.
        let client = LlmClient::new(&test_config("http://127.0.0.1:1", 5)).unwrap();
        let err = client.generate_content("prompt").await.unwrap_err();

        assert!(matches!(err, LlmError::Http(_)));
        assert!(!err.to_string().contains("test-key"));
    }
}
