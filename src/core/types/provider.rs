//! Provider descriptors
//!
//! Deserialized from the `api_providers` subtree of the state document. API
//! keys never appear in the state file; they are injected from the
//! environment after loading and are never serialized back out.

use serde::{Deserialize, Serialize};

/// Upstream wire dialect
///
/// The state document spells these `"openai"` and `"google"`; anything the
/// scan tool invents later is treated as openai-compatible, which is the
/// dialect every self-hosted runtime speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    OpenaiCompat,
    GoogleNative,
}

impl<'de> Deserialize<'de> for ProviderKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "google" | "google_native" => ProviderKind::GoogleNative,
            _ => ProviderKind::OpenaiCompat,
        })
    }
}

/// A single upstream model provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    /// Base URL of the upstream (absent for the google-native dialect)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Upstream model identifier
    pub model: String,
    /// Injected from the environment, never part of any state snapshot
    #[serde(skip)]
    pub api_key: Option<String>,
}
