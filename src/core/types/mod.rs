//! Core type definitions
//!
//! - `openai` - inbound/outbound OpenAI-compatible wire shapes
//! - `streaming` - SSE events and streaming chunk shapes
//! - `provider` - provider descriptors loaded from the state document

pub mod openai;
pub mod provider;
pub mod streaming;

pub use openai::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, MessageRole,
    ModelEntry, ModelList,
};
pub use provider::{ProviderDescriptor, ProviderKind};
pub use streaming::{ChatCompletionChunk, ChunkChoice, ChunkDelta, Event};
