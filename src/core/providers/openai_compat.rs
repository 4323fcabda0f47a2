//! OpenAI-compatible dialect adapter
//!
//! Forwards the full inbound message list to `{url}/chat/completions` and
//! reshapes nothing except the `model` field, which is always rewritten to
//! the id the client originally asked for.

use super::sse::SseLineBuffer;
use super::SseByteStream;
use crate::core::types::{ChatMessage, Event};
use crate::core::types::provider::ProviderDescriptor;
use crate::utils::error::{GatewayError, Result};
use futures_util::StreamExt;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

/// Overall timeout for the upstream call
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(40);

fn endpoint(provider: &ProviderDescriptor) -> Result<String> {
    let base = provider.url.as_deref().ok_or_else(|| {
        GatewayError::config(format!("provider {} has no upstream url", provider.id))
    })?;
    Ok(format!("{}/chat/completions", base.trim_end_matches('/')))
}

/// Overwrite the response's `model` field with the client's requested id
pub(crate) fn rewrite_model(value: &mut Value, client_model: &str) {
    if let Some(object) = value.as_object_mut() {
        object.insert("model".to_string(), json!(client_model));
    }
}

async fn send(
    http: &reqwest::Client,
    provider: &ProviderDescriptor,
    messages: &[ChatMessage],
    stream: bool,
) -> Result<reqwest::Response> {
    let body = json!({
        "model": provider.model,
        "messages": messages,
        "stream": stream,
    });

    let mut request = http.post(endpoint(provider)?).json(&body);
    if let Some(api_key) = &provider.api_key {
        request = request.bearer_auth(api_key);
    }

    let response = timeout(REQUEST_TIMEOUT, request.send())
        .await
        .map_err(|_| GatewayError::provider(format!("{}: request timeout", provider.id)))?
        .map_err(|e| GatewayError::provider(format!("{}: {}", provider.id, e)))?;

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

/// Buffered completion
pub async fn complete(
    http: &reqwest::Client,
    provider: &ProviderDescriptor,
    messages: &[ChatMessage],
    client_model: &str,
) -> Result<Value> {
    let response = send(http, provider, messages, false).await?;
    let mut value: Value = response
        .json()
        .await
        .map_err(|e| GatewayError::provider(format!("{}: invalid response: {}", provider.id, e)))?;
    rewrite_model(&mut value, client_model);
    Ok(value)
}

/// Streaming completion
///
/// Upstream chunks are re-emitted in order with their `model` rewritten; a
/// single `data: [DONE]` terminator is always appended, whether or not the
/// upstream sent its own.
pub async fn stream(
    http: &reqwest::Client,
    provider: &ProviderDescriptor,
    messages: &[ChatMessage],
    client_model: &str,
) -> Result<SseByteStream> {
    let response = send(http, provider, messages, true).await?;
    let provider_id = provider.id.clone();
    let client_model = client_model.to_string();

    let body = async_stream::stream! {
        let mut upstream = response.bytes_stream();
        let mut lines = SseLineBuffer::new();

        while let Some(chunk) = upstream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!("Stream from {} interrupted: {}", provider_id, e);
                    break;
                }
            };
            for payload in lines.push(&chunk) {
                if payload == "[DONE]" {
                    continue;
                }
                match serde_json::from_str::<Value>(&payload) {
                    Ok(mut value) => {
                        rewrite_model(&mut value, &client_model);
                        yield Ok::<_, GatewayError>(Event::data(value.to_string()).to_bytes());
                    }
                    Err(e) => warn!("Skipping malformed chunk from {}: {}", provider_id, e),
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
    use crate::core::types::provider::ProviderKind;

    fn provider(url: Option<&str>) -> ProviderDescriptor {
        ProviderDescriptor {
            id: "groq".to_string(),
            name: "Groq".to_string(),
            kind: ProviderKind::OpenaiCompat,
            url: url.map(|u| u.to_string()),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: None,
        }
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint(&provider(Some("https://api.groq.com/openai/v1/"))).unwrap(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn endpoint_requires_url() {
        assert!(endpoint(&provider(None)).is_err());
    }

    #[test]
    fn rewrite_model_overwrites_upstream_id() {
        let mut value = json!({"id": "x", "model": "llama-3.3-70b-versatile", "choices": []});
        rewrite_model(&mut value, "qwen-max");
        assert_eq!(value["model"], "qwen-max");
    }

    #[test]
    fn rewrite_model_inserts_when_missing() {
        let mut value = json!({"id": "x"});
        rewrite_model(&mut value, "qwen-max");
        assert_eq!(value["model"], "qwen-max");
    }
}
