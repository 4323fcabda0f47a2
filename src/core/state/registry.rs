//! Provider registry

use crate::core::types::ProviderDescriptor;
use crate::utils::error::{GatewayError, Result};
use std::collections::HashMap;

/// Immutable mapping of provider id to descriptor
///
/// Built once per state load and swapped in atomically; requests hold their
/// snapshot for their whole lifetime. Iteration order is the key order of the
/// `api_providers` object (sorted), which keeps last-resort fallback
/// selection deterministic.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, ProviderDescriptor>,
    order: Vec<String>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the `api_providers` subtree of the state document
    pub fn from_state(value: &serde_json::Value) -> Result<Self> {
        let entries = value
            .as_object()
            .ok_or_else(|| GatewayError::config("api_providers is not an object"))?;

        let mut registry = Self::new();
        for (id, entry) in entries {
            let mut descriptor: ProviderDescriptor = serde_json::from_value(entry.clone())?;
            descriptor.id = id.clone();
            registry.insert(descriptor);
        }
        Ok(registry)
    }

    /// Insert a descriptor, keyed by its id
    pub fn insert(&mut self, descriptor: ProviderDescriptor) {
        if !self.providers.contains_key(&descriptor.id) {
            self.order.push(descriptor.id.clone());
        }
        self.providers.insert(descriptor.id.clone(), descriptor);
    }

    /// Look up a provider by id
    pub fn get(&self, id: &str) -> Option<&ProviderDescriptor> {
        self.providers.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut ProviderDescriptor> {
        self.providers.get_mut(id)
    }

    /// Provider ids in registry order
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
