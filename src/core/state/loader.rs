//! Checksum-validated state loading
//!
//! The state document is produced by an external scan tool using an
//! atomic-rename protocol: it writes `state.json`, then a sibling file with
//! the hex SHA-256 of the document bytes. The loader accepts a document only
//! when the recomputed digest matches the checksum file exactly; a single
//! mismatch is retried once after one second to ride out the writer's rename
//! window.

use super::registry::ProviderRegistry;
use crate::utils::error::{GatewayError, Result};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Minimum interval between disk reads (unless forced or registry empty)
const RELOAD_INTERVAL: Duration = Duration::from_secs(60);

/// Pause before the single checksum-mismatch retry
const CHECKSUM_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Periodically reloads the provider registry from the on-disk state document
pub struct StateLoader {
    state_file: PathBuf,
    checksum_file: PathBuf,
    registry: ArcSwap<ProviderRegistry>,
    last_load: Mutex<Option<Instant>>,
}

impl StateLoader {
    /// Create a loader for the given state and checksum files
    pub fn new(state_file: PathBuf, checksum_file: PathBuf) -> Self {
        Self {
            state_file,
            checksum_file,
            registry: ArcSwap::from_pointee(ProviderRegistry::new()),
            last_load: Mutex::new(None),
        }
    }

    /// Current registry snapshot
    ///
    /// Callers hold the returned `Arc` for the lifetime of their request, so
    /// a concurrent reload never changes the view mid-request.
    pub fn snapshot(&self) -> Arc<ProviderRegistry> {
        self.registry.load_full()
    }

    /// Ensure the registry reflects the on-disk state
    ///
    /// Subject to the 60-second debounce unless `force` is set or the
    /// registry is still empty. All failures are logged and swallowed; the
    /// previous registry is preserved.
    pub async fn refresh(&self, force: bool) {
        if !force && !self.due() {
            return;
        }

        match self.try_load().await {
            Ok(count) => info!("State loaded successfully ({} providers)", count),
            Err(e) => warn!("Error loading state: {}", e),
        }
    }

    fn due(&self) -> bool {
        if self.registry.load().is_empty() {
            return true;
        }
        match *self.last_load.lock() {
            Some(at) => at.elapsed() >= RELOAD_INTERVAL,
            None => true,
        }
    }

    async fn try_load(&self) -> Result<usize> {
        let mut registry = match self.read_validated().await {
            Err(GatewayError::StateChecksum(detail)) => {
                warn!("State file checksum mismatch, retrying once: {}", detail);
                tokio::time::sleep(CHECKSUM_RETRY_DELAY).await;
                self.read_validated().await?
            }
            other => other?,
        };

        enrich_api_keys(&mut registry);
        let count = registry.len();
        self.registry.store(Arc::new(registry));
        *self.last_load.lock() = Some(Instant::now());
        Ok(count)
    }

    async fn read_validated(&self) -> Result<ProviderRegistry> {
        let expected = tokio::fs::read_to_string(&self.checksum_file).await?;
        let expected = expected.trim();

        let content = tokio::fs::read(&self.state_file).await?;
        let computed = hex::encode(Sha256::digest(&content));
        if computed != expected {
            return Err(GatewayError::state_checksum(format!(
                "expected {}, computed {}",
                expected, computed
            )));
        }

        let state: serde_json::Value = serde_json::from_slice(&content)?;
        let providers = state
            .get("api_providers")
            .ok_or_else(|| GatewayError::config("state document missing api_providers"))?;
        ProviderRegistry::from_state(providers)
    }
}

/// Inject environment-sourced API keys into known cloud providers
///
/// Keys are never present in the state file. The google-native provider
/// needs none here: it authenticates through the shared Google client.
fn enrich_api_keys(registry: &mut ProviderRegistry) {
    if let Some(provider) = registry.get_mut("qwen_cloud") {
        provider.api_key = std::env::var("DASHSCOPE_API_KEY").ok();
    }
    if let Some(provider) = registry.get_mut("groq") {
        provider.api_key = std::env::var("GROQ_API_KEY").ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};
    use std::path::Path;

    const STATE: &str = r#"{
        "generated_at": "2026-01-20T10:00:00Z",
        "api_providers": {
            "groq": {"id": "groq", "name": "Groq", "type": "openai",
                     "url": "https://api.groq.com/openai/v1", "model": "llama-3.3-70b-versatile"},
            "ollama": {"id": "ollama", "name": "Ollama (Local GPU)", "type": "openai",
                       "url": "http://127.0.0.1:11434/v1", "model": "qwen2.5-coder:32b"}
        }
    }"#;

    fn write_state(dir: &Path, content: &str, checksum: &str) -> (PathBuf, PathBuf) {
        let state_file = dir.join("state.json");
        let checksum_file = dir.join("state.json.checksum");
        std::fs::write(&state_file, content).unwrap();
        std::fs::write(&checksum_file, checksum).unwrap();
        (state_file, checksum_file)
    }

    fn digest_of(content: &str) -> String {
        hex::encode(Sha256::digest(content.as_bytes()))
    }

    #[tokio::test]
    async fn valid_checksum_loads_registry() {
        let dir = tempfile::tempdir().unwrap();
        let (state_file, checksum_file) = write_state(dir.path(), STATE, &digest_of(STATE));

        let loader = StateLoader::new(state_file, checksum_file);
        loader.refresh(true).await;

        let registry = loader.snapshot();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("groq").is_some());
    }

    #[tokio::test]
    async fn trailing_whitespace_in_checksum_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let checksum = format!("{}\n", digest_of(STATE));
        let (state_file, checksum_file) = write_state(dir.path(), STATE, &checksum);

        let loader = StateLoader::new(state_file, checksum_file);
        loader.refresh(true).await;
        assert_eq!(loader.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn checksum_mismatch_preserves_previous_registry() {
        let dir = tempfile::tempdir().unwrap();
        let (state_file, checksum_file) = write_state(dir.path(), STATE, &digest_of("tampered"));

        let loader = StateLoader::new(state_file, checksum_file);
        loader.refresh(true).await;
        assert!(loader.snapshot().is_empty());
    }

    #[tokio::test]
    async fn retry_recovers_from_writer_rename_race() {
        let dir = tempfile::tempdir().unwrap();
        let (state_file, checksum_file) = write_state(dir.path(), STATE, &digest_of("mid-write"));

        // Simulate the writer finishing its atomic rename during the retry pause
        let fixup = checksum_file.clone();
        let writer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            std::fs::write(&fixup, digest_of(STATE)).unwrap();
        });

        let loader = StateLoader::new(state_file, checksum_file);
        loader.refresh(true).await;
        writer.await.unwrap();

        assert_eq!(loader.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn missing_files_leave_registry_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loader = StateLoader::new(
            dir.path().join("state.json"),
            dir.path().join("state.json.checksum"),
        );
        loader.refresh(true).await;
        assert!(loader.snapshot().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_preserves_previous_registry() {
        let dir = tempfile::tempdir().unwrap();
        let (state_file, checksum_file) = write_state(dir.path(), STATE, &digest_of(STATE));
        let loader = StateLoader::new(state_file.clone(), checksum_file.clone());
        loader.refresh(true).await;
        assert_eq!(loader.snapshot().len(), 2);

        // Corrupt the document but keep the checksum consistent with it
        let broken = "{not json";
        std::fs::write(&state_file, broken).unwrap();
        std::fs::write(&checksum_file, digest_of(broken)).unwrap();
        loader.refresh(true).await;

        assert_eq!(loader.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn debounce_skips_disk_until_interval() {
        let dir = tempfile::tempdir().unwrap();
        let (state_file, checksum_file) = write_state(dir.path(), STATE, &digest_of(STATE));
        let loader = StateLoader::new(state_file.clone(), checksum_file.clone());
        loader.refresh(true).await;
        assert_eq!(loader.snapshot().len(), 2);

        // Replace on-disk state; a non-forced refresh inside the window must
        // keep serving the cached registry
        let updated = STATE.replace("llama-3.3-70b-versatile", "llama-updated");
        std::fs::write(&state_file, &updated).unwrap();
        std::fs::write(&checksum_file, digest_of(&updated)).unwrap();
        loader.refresh(false).await;
        assert_eq!(
            loader.snapshot().get("groq").unwrap().model,
            "llama-3.3-70b-versatile"
        );

        loader.refresh(true).await;
        assert_eq!(loader.snapshot().get("groq").unwrap().model, "llama-updated");
    }
}
