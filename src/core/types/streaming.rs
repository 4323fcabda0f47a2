//! Type definitions for streaming responses

use super::openai::MessageRole;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Simple event structure for SSE framing
#[derive(Debug, Clone, Default)]
pub struct Event {
    /// Event data
    pub data: String,
}

impl Event {
    /// Create an event carrying the given data payload
    pub fn data(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    /// The `[DONE]` sentinel terminator
    pub fn done() -> Self {
        Self::data("[DONE]")
    }

    /// Convert event to bytes for SSE transmission
    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(format!("data: {}\n\n", self.data))
    }
}

/// Streaming response chunk for chat completions
///
/// `finish_reason` serializes as an explicit `null` until the final chunk,
/// matching what OpenAI-compatible clients expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: String,
    pub model: String,
    pub choices: Vec<ChunkChoice>,
}

/// Choice in a streaming chat completion chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkChoice {
    pub index: u32,
    pub delta: ChunkDelta,
    pub finish_reason: Option<String>,
}

/// Delta containing incremental content in a streaming response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<MessageRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    /// Synthesize a single-delta chunk with a fresh id
    pub fn from_delta(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            object: "chat.completion.chunk".to_string(),
            model: model.into(),
            choices: vec![ChunkChoice {
                index: 0,
                delta: ChunkDelta {
                    role: None,
                    content: Some(content.into()),
                },
                finish_reason: None,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_framing() {
        let event = Event::data(r#"{"x":1}"#);
        assert_eq!(&event.to_bytes()[..], b"data: {\"x\":1}\n\n");
        assert_eq!(&Event::done().to_bytes()[..], b"data: [DONE]\n\n");
    }

    #[test]
    fn synthesized_chunk_shape() {
        let chunk = ChatCompletionChunk::from_delta("qwen-max", "a");
        let value = serde_json::to_value(&chunk).unwrap();
        assert_eq!(value["object"], "chat.completion.chunk");
        assert_eq!(value["model"], "qwen-max");
        assert_eq!(value["choices"][0]["delta"]["content"], "a");
        // finish_reason must be present and null mid-stream
        assert!(value["choices"][0]["finish_reason"].is_null());
        assert!(
            value["choices"][0]
                .as_object()
                .unwrap()
                .contains_key("finish_reason")
        );
    }
}
