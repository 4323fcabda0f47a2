//! Provider waterfall execution
//!
//! Tries providers in ranked order until one succeeds. Quota-exhaustion
//! failures put the provider on cooldown; anything else falls through
//! without cooldown so transient errors never evict a provider.

use crate::core::health::{HealthTracker, is_quota_error};
use crate::core::providers::{GoogleClient, ProviderReply, google, openai_compat};
use crate::core::state::ProviderRegistry;
use crate::core::types::ChatMessage;
use crate::core::types::provider::{ProviderDescriptor, ProviderKind};
use crate::utils::error::{GatewayError, Result};
use tracing::{error, info};

/// Waterfall executor over a registry snapshot
pub struct WaterfallExecutor<'a> {
    pub registry: &'a ProviderRegistry,
    pub health: &'a HealthTracker,
    pub http: &'a reqwest::Client,
    pub google: &'a GoogleClient,
}

impl WaterfallExecutor<'_> {
    /// Attempt order: the preferred provider first, then the remaining sane
    /// providers in their original order
    pub fn ranked(preferred: Option<&str>, sane: &[String]) -> Vec<String> {
        let mut attempts = Vec::with_capacity(sane.len() + 1);
        if let Some(preferred) = preferred {
            attempts.push(preferred.to_string());
        }
        for id in sane {
            if Some(id.as_str()) != preferred {
                attempts.push(id.clone());
            }
        }
        attempts
    }

    /// Run the waterfall until a provider succeeds
    pub async fn execute(
        &self,
        attempts: &[String],
        messages: &[ChatMessage],
        stream: bool,
        client_model: &str,
    ) -> Result<ProviderReply> {
        for id in attempts {
            let Some(provider) = self.registry.get(id) else {
                continue;
            };
            info!("Attempting {} [{}]", provider.name, provider.id);

            match self.invoke(provider, messages, stream, client_model).await {
                Ok(reply) => {
                    self.health.mark_success(id).await;
                    return Ok(reply);
                }
                Err(e) => {
                    let text = e.to_string();
                    error!("Provider {} failed: {}", id, text);
                    if is_quota_error(&text) {
                        self.health.mark_failure(id).await;
                    }
                }
            }
        }
        Err(GatewayError::no_providers("All providers failed."))
    }

    async fn invoke(
        &self,
        provider: &ProviderDescriptor,
        messages: &[ChatMessage],
        stream: bool,
        client_model: &str,
    ) -> Result<ProviderReply> {
        match (provider.kind, stream) {
            (ProviderKind::OpenaiCompat, false) => {
                openai_compat::complete(self.http, provider, messages, client_model)
                    .await
                    .map(ProviderReply::Buffered)
            }
            (ProviderKind::OpenaiCompat, true) => {
                openai_compat::stream(self.http, provider, messages, client_model)
                    .await
                    .map(ProviderReply::Stream)
            }
            (ProviderKind::GoogleNative, false) => {
                google::complete(self.google, provider, messages, client_model)
                    .await
                    .map(ProviderReply::Buffered)
            }
            (ProviderKind::GoogleNative, true) => {
                google::stream(self.google, provider, messages, client_model)
                    .await
                    .map(ProviderReply::Stream)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sane(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ranked_puts_preferred_first_without_duplicates() {
        let order = WaterfallExecutor::ranked(
            Some("groq"),
            &sane(&["gemini-flash", "groq", "ollama"]),
        );
        assert_eq!(order, vec!["groq", "gemini-flash", "ollama"]);
    }

    #[test]
    fn ranked_keeps_manual_target_even_when_not_sane() {
        let order = WaterfallExecutor::ranked(Some("qwen_cloud"), &sane(&["groq"]));
        assert_eq!(order, vec!["qwen_cloud", "groq"]);
    }

    #[test]
    fn ranked_without_preference_is_the_sane_order() {
        let order = WaterfallExecutor::ranked(None, &sane(&["gemini-flash", "groq"]));
        assert_eq!(order, vec!["gemini-flash", "groq"]);
    }

    #[test]
    fn ranked_empty_inputs_yield_no_attempts() {
        assert!(WaterfallExecutor::ranked(None, &[]).is_empty());
    }
}
