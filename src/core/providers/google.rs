//! Google-native dialect
//!
//! Speaks the Generative Language REST API directly. One client is built at
//! startup with the SDK-level key; both the gemini-flash provider and the
//! judge models go through it. The dialect takes a single prompt (the last
//! message's content) rather than a chat array, so responses are synthesized
//! back into the OpenAI shape.

use super::sse::SseLineBuffer;
use super::SseByteStream;
use crate::core::types::provider::ProviderDescriptor;
use crate::core::types::{ChatCompletionChunk, ChatCompletionResponse, ChatMessage, Event};
use crate::utils::error::{GatewayError, Result};
use futures::Stream;
use futures_util::StreamExt;
use serde_json::{Value, json};
use std::pin::Pin;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

/// Google AI Studio endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(40);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Generative Language API
#[derive(Debug, Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl GoogleClient {
    /// Create a client with the key loaded once at startup
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (test doubles)
    pub fn with_base_url(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key,
            base_url: base_url.into(),
        }
    }

    /// Endpoint URL; the key travels as a query parameter and must never be
    /// logged
    fn url(&self, model: &str, operation: &str, sse: bool) -> String {
        let mut url = format!("{}/models/{}:{}", self.base_url, model, operation);
        let mut params = Vec::new();
        if sse {
            params.push("alt=sse".to_string());
        }
        if let Some(key) = &self.api_key {
            params.push(format!("key={}", key));
        }
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }
        url
    }

    fn request_body(prompt: &str) -> Value {
        json!({"contents": [{"parts": [{"text": prompt}]}]})
    }

    async fn send(&self, url: &str, prompt: &str) -> Result<reqwest::Response> {
        let response = timeout(
            REQUEST_TIMEOUT,
            self.http.post(url).json(&Self::request_body(prompt)).send(),
        )
        .await
        .map_err(|_| GatewayError::provider("google: request timeout"))?
        .map_err(|e| GatewayError::provider(format!("google: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::provider(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text
            )));
        }
        Ok(response)
    }

    /// Buffered generation; returns the concatenated candidate text
    pub async fn generate_content(&self, model: &str, prompt: &str) -> Result<String> {
        let url = self.url(model, "generateContent", false);
        let response = self.send(&url, prompt).await?;

        let value: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::provider(format!("google: invalid response: {}", e)))?;
        if let Some(error) = value.get("error") {
            return Err(GatewayError::provider(format!("google: {}", error)));
        }
        extract_text(&value)
            .ok_or_else(|| GatewayError::provider("google: response carried no candidates"))
    }

    /// Streaming generation; yields candidate text deltas in upstream order
    pub async fn stream_content(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String>> + Send>>> {
        let url = self.url(model, "streamGenerateContent", true);
        let response = self.send(&url, prompt).await?;

        Ok(Box::pin(async_stream::stream! {
            let mut upstream = response.bytes_stream();
            let mut lines = SseLineBuffer::new();

            while let Some(chunk) = upstream.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(GatewayError::provider(format!("google: {}", e)));
                        break;
                    }
                };
                for payload in lines.push(&chunk) {
                    if payload == "[DONE]" {
                        continue;
                    }
                    if let Ok(value) = serde_json::from_str::<Value>(&payload) {
                        if let Some(text) = extract_text(&value) {
                            if !text.is_empty() {
                                yield Ok(text);
                            }
                        }
                    }
                }
            }
        }))
    }
}

/// Concatenated text parts of the first candidate
fn extract_text(value: &Value) -> Option<String> {
    let parts = value
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();
    Some(text)
}

fn last_message_content(messages: &[ChatMessage]) -> Result<String> {
    messages
        .last()
        .map(|m| m.content.clone())
        .ok_or_else(|| GatewayError::provider("google: empty message list"))
}

/// Buffered adapter: synthesize a complete OpenAI-shaped response
pub async fn complete(
    client: &GoogleClient,
    provider: &ProviderDescriptor,
    messages: &[ChatMessage],
    client_model: &str,
) -> Result<Value> {
    let prompt = last_message_content(messages)?;
    let text = client.generate_content(&provider.model, &prompt).await?;
    let response = ChatCompletionResponse::from_text(client_model, text);
    Ok(serde_json::to_value(response)?)
}

/// Streaming adapter: one OpenAI-shaped frame per upstream text delta
pub async fn stream(
    client: &GoogleClient,
    provider: &ProviderDescriptor,
    messages: &[ChatMessage],
    client_model: &str,
) -> Result<SseByteStream> {
    let prompt = last_message_content(messages)?;
    let upstream = client.stream_content(&provider.model, &prompt).await?;
    let client_model = client_model.to_string();

    let body = async_stream::stream! {
        let mut upstream = upstream;
        while let Some(delta) = upstream.next().await {
            match delta {
                Ok(text) => {
                    let chunk = ChatCompletionChunk::from_delta(&client_model, text);
                    match serde_json::to_string(&chunk) {
                        Ok(frame) => yield Ok::<_, GatewayError>(Event::data(frame).to_bytes()),
                        Err(e) => warn!("Failed to serialize google chunk: {}", e),
                    }
                }
                Err(e) => {
                    warn!("Google stream interrupted: {}", e);
                    break;
                }
            }
        }
        yield Ok::<_, GatewayError>(Event::done().to_bytes());
    };

    Ok(Box::pin(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_candidate_text() {
        let value = json!({
            "candidates": [{"content": {"parts": [{"text": "hel"}, {"text": "lo"}]}}]
        });
        assert_eq!(extract_text(&value), Some("hello".to_string()));
    }

    #[test]
    fn missing_candidates_yield_none() {
        assert_eq!(extract_text(&json!({"promptFeedback": {}})), None);
    }

    #[test]
    fn url_carries_sse_and_key_parameters() {
        let client = GoogleClient::with_base_url(Some("k123".to_string()), "http://localhost:1");
        assert_eq!(
            client.url("gemini-2.0-flash", "streamGenerateContent", true),
            "http://localhost:1/models/gemini-2.0-flash:streamGenerateContent?alt=sse&key=k123"
        );
        assert_eq!(
            client.url("gemma-3-4b-it", "generateContent", false),
            "http://localhost:1/models/gemma-3-4b-it:generateContent?key=k123"
        );
    }

    #[test]
    fn url_without_key_has_no_query() {
        let client = GoogleClient::with_base_url(None, "http://localhost:1");
        assert_eq!(
            client.url("gemma-3-4b-it", "generateContent", false),
            "http://localhost:1/models/gemma-3-4b-it:generateContent"
        );
    }

    #[test]
    fn prompt_is_last_message_only() {
        let messages = vec![
            ChatMessage::system("context"),
            ChatMessage::user("question"),
        ];
        assert_eq!(last_message_content(&messages).unwrap(), "question");
        assert!(last_message_content(&[]).is_err());
    }
}
