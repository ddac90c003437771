/// LLM Client — the single point of entry for all Azure OpenAI calls in Lexpost.
///
/// ARCHITECTURAL RULE: No other module may call the Azure endpoints directly.
/// Generation code talks to `GenerationBackend`; this client is its production implementation.
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AzureConfig;
use crate::generation::backend::GenerationBackend;

pub mod prompts;

const CHAT_API_VERSION: &str = "2024-02-15-preview";
const IMAGE_API_VERSION: &str = "2024-02-01";
const IMAGE_SIZE: &str = "1024x1024";
const IMAGE_QUALITY: &str = "standard";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// One turn of a chat conversation. Also stored in the session for conversational edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text content from the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
    size: &'a str,
    quality: &'a str,
    n: u8,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AzureError {
    error: AzureErrorBody,
}

#[derive(Debug, Deserialize)]
struct AzureErrorBody {
    message: String,
}

/// Wraps the Azure OpenAI chat-completions and image-generation deployments.
/// Each call is sent once; failures are returned to the caller.
#[derive(Clone)]
pub struct AzureClient {
    client: Client,
    azure: AzureConfig,
}

impl AzureClient {
    pub fn new(azure: AzureConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            azure,
        })
    }

    /// Runs a chat completion and returns the first choice's text.
    pub async fn chat(&self, messages: &[ChatMessage], temperature: f32) -> Result<String, LlmError> {
        let url = deployment_url(
            &self.azure.text_endpoint,
            &self.azure.text_deployment,
            "chat/completions",
            CHAT_API_VERSION,
        );
        let body = ChatRequest {
            messages,
            temperature,
        };

        let response = self
            .send(
                self.client
                    .post(&url)
                    .header("api-key", &self.azure.text_key)
                    .json(&body),
            )
            .await?;

        let chat: ChatResponse = serde_json::from_str(&response)?;

        if let Some(usage) = &chat.usage {
            debug!(
                "Chat call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        let text = chat.text().map(strip_markdown_fences).unwrap_or_default();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text.to_string())
    }

    /// Generates one image for `prompt` and downloads its bytes.
    pub async fn image(&self, prompt: &str) -> Result<Bytes, LlmError> {
        let url = deployment_url(
            &self.azure.image_endpoint,
            &self.azure.image_deployment,
            "images/generations",
            IMAGE_API_VERSION,
        );
        let body = ImageRequest {
            prompt,
            size: IMAGE_SIZE,
            quality: IMAGE_QUALITY,
            n: 1,
        };

        let response = self
            .send(
                self.client
                    .post(&url)
                    .header("api-key", &self.azure.image_key)
                    .json(&body),
            )
            .await?;

        let generated: ImageResponse = serde_json::from_str(&response)?;
        let image_url = generated
            .data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or(LlmError::EmptyContent)?;

        let download = self.client.get(&image_url).send().await?;
        if !download.status().is_success() {
            return Err(LlmError::Api {
                status: download.status().as_u16(),
                message: "image download failed".to_string(),
            });
        }
        Ok(download.bytes().await?)
    }

    /// Sends `request` once and returns the response body of a successful call.
    async fn send(&self, request: RequestBuilder) -> Result<String, LlmError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Azure API returned {status}");
            return Err(api_error(status.as_u16(), body));
        }
        Ok(body)
    }
}

#[async_trait]
impl GenerationBackend for AzureClient {
    async fn complete(&self, messages: &[ChatMessage], temperature: f32) -> Result<String, LlmError> {
        self.chat(messages, temperature).await
    }

    async fn generate_image(&self, prompt: &str) -> Result<Bytes, LlmError> {
        self.image(prompt).await
    }
}

/// Maps a non-success response to `LlmError::Api`, preferring Azure's own
/// error message over the raw body.
fn api_error(status: u16, body: String) -> LlmError {
    let message = serde_json::from_str::<AzureError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    LlmError::Api { status, message }
}

fn deployment_url(endpoint: &str, deployment: &str, operation: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{}/{}?api-version={}",
        endpoint.trim_end_matches('/'),
        deployment,
        operation,
        api_version
    )
}

/// Strips a ```markdown ... ``` (or bare ```) fence wrapping the whole reply.
fn strip_markdown_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```markdown")
        .or_else(|| text.strip_prefix("```md"))
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_url_trims_trailing_slash() {
        let url = deployment_url(
            "https://example.openai.azure.com/",
            "gpt-4o",
            "chat/completions",
            CHAT_API_VERSION,
        );
        assert_eq!(
            url,
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-02-15-preview"
        );
    }

    #[test]
    fn test_strip_markdown_fences_with_tag() {
        let input = "```markdown\n# Title\n\nBody\n```";
        assert_eq!(strip_markdown_fences(input), "# Title\n\nBody");
    }

    #[test]
    fn test_strip_markdown_fences_without_tag() {
        let input = "```\n# Title\n```";
        assert_eq!(strip_markdown_fences(input), "# Title");
    }

    #[test]
    fn test_strip_markdown_fences_no_fences() {
        let input = "# Title\n\n**bold** text";
        assert_eq!(strip_markdown_fences(input), input);
    }

    #[test]
    fn test_chat_response_text_reads_first_choice() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Hello"}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.text(), Some("Hello"));
    }

    #[test]
    fn test_chat_response_without_content_has_no_text() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.text(), None);
    }

    #[test]
    fn test_api_error_prefers_azure_message() {
        let body = r#"{"error": {"code": "content_filter", "message": "The prompt was filtered."}}"#;
        match api_error(400, body.to_string()) {
            LlmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "The prompt was filtered.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_keeps_raw_body() {
        match api_error(503, "upstream unavailable".to_string()) {
            LlmError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    mod http {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        use axum::{http::StatusCode, routing::post, Router};

        use super::*;

        /// Serves `status` and `body` for every POST and counts the hits.
        async fn azure_stub(status: StatusCode, body: &'static str) -> (AzureClient, Arc<AtomicUsize>) {
            let hits = Arc::new(AtomicUsize::new(0));
            let counter = hits.clone();
            let router = Router::new().route(
                "/openai/deployments/:deployment/*operation",
                post(move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        (status, body)
                    }
                }),
            );
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let endpoint = format!("http://{}", listener.local_addr().unwrap());
            tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

            let client = AzureClient::new(AzureConfig {
                text_endpoint: endpoint.clone(),
                text_key: "k".to_string(),
                text_deployment: "text".to_string(),
                image_endpoint: endpoint,
                image_key: "k".to_string(),
                image_deployment: "image".to_string(),
            })
            .unwrap();
            (client, hits)
        }

        #[tokio::test]
        async fn test_rate_limit_is_reported_once_without_retry() {
            let (client, hits) =
                azure_stub(StatusCode::TOO_MANY_REQUESTS, r#"{"error": {"message": "slow down"}}"#).await;

            let err = client.chat(&[ChatMessage::user("hi")], 0.7).await.unwrap_err();
            assert!(
                matches!(&err, LlmError::Api { status: 429, message } if message == "slow down"),
                "{err:?}"
            );
            assert_eq!(hits.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn test_server_error_on_image_is_not_retried() {
            let (client, hits) = azure_stub(StatusCode::BAD_GATEWAY, "bad gateway").await;

            let err = client.image("a courthouse").await.unwrap_err();
            assert!(matches!(err, LlmError::Api { status: 502, .. }), "{err:?}");
            assert_eq!(hits.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn test_malformed_body_is_parse_error() {
            let (client, _) = azure_stub(StatusCode::OK, "not json").await;

            let err = client.chat(&[ChatMessage::user("hi")], 0.7).await.unwrap_err();
            assert!(matches!(err, LlmError::Parse(_)), "{err:?}");
        }

        #[tokio::test]
        async fn test_successful_chat_strips_fences() {
            let (client, _) = azure_stub(
                StatusCode::OK,
                r#"{"choices": [{"message": {"content": "```markdown\n# Post\n```"}}]}"#,
            )
            .await;

            let text = client.chat(&[ChatMessage::user("hi")], 0.7).await.unwrap();
            assert_eq!(text, "# Post");
        }
    }
}
