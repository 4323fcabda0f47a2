//! Routing decision
//!
//! `decide` is a pure function over the judge's classification, GPU
//! readiness and the sane-provider list. The waterfall executor appends the
//! remaining sane providers behind the preferred one, so this only picks the
//! head of the attempt order.

use crate::core::judge::Category;
use parking_lot::RwLock;

/// Well-known provider ids from the infrastructure state document
pub mod ids {
    /// Local GPU inference server
    pub const LOCAL_GPU: &str = "ollama";
    /// Cloud coding provider
    pub const QWEN_CLOUD: &str = "qwen_cloud";
    /// Fast free-tier chat provider
    pub const GROQ: &str = "groq";
    /// Fallback chat provider
    pub const GEMINI_FLASH: &str = "gemini-flash";
}

/// Pick the preferred provider for a classified request
///
/// Returns `None` only when `sane` is empty.
pub fn decide(category: Category, gpu_ready: bool, sane: &[String]) -> Option<String> {
    let is_sane = |id: &str| sane.iter().any(|s| s == id);

    if category == Category::Coding {
        if gpu_ready && is_sane(ids::LOCAL_GPU) {
            return Some(ids::LOCAL_GPU.to_string());
        }
        if is_sane(ids::QWEN_CLOUD) {
            return Some(ids::QWEN_CLOUD.to_string());
        }
        return sane.first().cloned();
    }

    if is_sane(ids::GROQ) {
        return Some(ids::GROQ.to_string());
    }
    if is_sane(ids::GEMINI_FLASH) {
        return Some(ids::GEMINI_FLASH.to_string());
    }
    sane.first().cloned()
}

/// Process-wide routing mode
///
/// Deliberately process-local: the system runs as a single instance. A
/// multi-process deployment would have to move this into Redis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingMode {
    #[default]
    Auto,
    Manual,
}

/// Mutable routing-mode state shared across request handlers
#[derive(Debug, Default)]
pub struct RoutingState {
    pub mode: RoutingMode,
    pub manual_target: Option<String>,
}

impl RoutingState {
    /// Resolve the preferred provider, honouring manual mode
    ///
    /// In manual mode the configured target replaces the automatic decision
    /// without any sanity checking.
    pub fn preferred(&self, automatic: Option<String>) -> Option<String> {
        match self.mode {
            RoutingMode::Auto => automatic,
            RoutingMode::Manual => self.manual_target.clone(),
        }
    }
}

/// Shared handle to the routing state
pub type SharedRoutingState = std::sync::Arc<RwLock<RoutingState>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sane(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn coding_prefers_local_gpu_when_green() {
        let sane = sane(&["gemini-flash", "groq", "ollama", "qwen_cloud"]);
        assert_eq!(
            decide(Category::Coding, true, &sane),
            Some("ollama".to_string())
        );
    }

    #[test]
    fn coding_offloads_to_qwen_when_gpu_busy() {
        let sane = sane(&["gemini-flash", "groq", "qwen_cloud"]);
        assert_eq!(
            decide(Category::Coding, false, &sane),
            Some("qwen_cloud".to_string())
        );
    }

    #[test]
    fn coding_with_gpu_green_but_local_cooling_uses_qwen() {
        let sane = sane(&["groq", "qwen_cloud"]);
        assert_eq!(
            decide(Category::Coding, true, &sane),
            Some("qwen_cloud".to_string())
        );
    }

    #[test]
    fn coding_falls_back_to_first_sane() {
        let sane = sane(&["gemini-flash", "groq"]);
        assert_eq!(
            decide(Category::Coding, true, &sane),
            Some("gemini-flash".to_string())
        );
    }

    #[test]
    fn simple_prefers_groq_then_gemini_flash() {
        let sane1 = sane(&["gemini-flash", "groq", "ollama"]);
        assert_eq!(
            decide(Category::Simple, true, &sane1),
            Some("groq".to_string())
        );

        let sane2 = sane(&["gemini-flash", "ollama"]);
        assert_eq!(
            decide(Category::Simple, true, &sane2),
            Some("gemini-flash".to_string())
        );

        let sane3 = sane(&["ollama", "qwen_cloud"]);
        assert_eq!(
            decide(Category::Simple, true, &sane3),
            Some("ollama".to_string())
        );
    }

    #[test]
    fn empty_sane_list_has_no_decision() {
        assert_eq!(decide(Category::Coding, true, &[]), None);
        assert_eq!(decide(Category::Simple, false, &[]), None);
    }

    #[test]
    fn decide_is_deterministic() {
        let sane = sane(&["gemini-flash", "groq", "ollama", "qwen_cloud"]);
        let first = decide(Category::Coding, true, &sane);
        for _ in 0..10 {
            assert_eq!(decide(Category::Coding, true, &sane), first);
        }
    }

    #[test]
    fn manual_mode_overrides_decision_without_sanity_check() {
        let state = RoutingState {
            mode: RoutingMode::Manual,
            manual_target: Some("qwen_cloud".to_string()),
        };
        assert_eq!(
            state.preferred(Some("groq".to_string())),
            Some("qwen_cloud".to_string())
        );

        let auto = RoutingState::default();
        assert_eq!(
            auto.preferred(Some("groq".to_string())),
            Some("groq".to_string())
        );
    }
}
