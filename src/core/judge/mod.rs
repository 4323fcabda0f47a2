//! Request classification
//!
//! A lightweight judge model classifies each request's intent and language
//! before routing. The judge is advisory: every failure path collapses to
//! the default classification and never fails the outer request.

use crate::core::providers::GoogleClient;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Judge models in order of preference (free and fast)
pub const JUDGE_MODELS: &[&str] = &["gemma-3-4b-it", "gemini-2.0-flash-lite"];

/// Cap applied to the cleaned query before it reaches the judge
const MAX_QUERY_CHARS: usize = 500;

/// Coding-assistant boilerplate markers; everything from the first match on
/// is noise that would confuse the judge
const CLEAN_MARKERS: &[&str] = &["To suggest changes", "Reply in English"];

/// Request intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Coding,
    Simple,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Coding => write!(f, "CODING"),
            Category::Simple => write!(f, "SIMPLE"),
        }
    }
}

/// Judge verdict steering the routing decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub language: String,
}

impl Default for Classification {
    /// Fallback for a single-user Italian deployment
    fn default() -> Self {
        Self {
            category: Category::Simple,
            language: "Italian".to_string(),
        }
    }
}

/// Raw judge reply
#[derive(Deserialize)]
struct JudgeVerdict {
    cat: String,
    lang: String,
}

/// Strip assistant boilerplate and cap the query length
pub fn clean_query(raw: &str) -> String {
    let mut cut = raw;
    for marker in CLEAN_MARKERS {
        if let Some(position) = cut.find(marker) {
            cut = &cut[..position];
        }
    }
    cut.trim().chars().take(MAX_QUERY_CHARS).collect()
}

fn build_prompt(query: &str) -> String {
    format!(
        "TASK: Analyze user intent and language.\n\
         QUERY: \"{}\"\n\n\
         RESPOND ONLY JSON:\n\
         {{\n\
           \"cat\": \"CODING\" (tech, code, debug) or \"SIMPLE\" (chat, info),\n\
           \"lang\": \"language_name\" (e.g. Italian, English)\n\
         }}",
        query
    )
}

fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

fn parse_verdict(text: &str) -> Option<Classification> {
    let verdict: JudgeVerdict = serde_json::from_str(&strip_code_fences(text)).ok()?;
    let category = if verdict.cat.eq_ignore_ascii_case("CODING") {
        Category::Coding
    } else {
        Category::Simple
    };
    Some(Classification {
        category,
        language: verdict.lang,
    })
}

/// Judge client with a fallback chain of small models
#[derive(Clone)]
pub struct JudgeClient {
    google: Arc<GoogleClient>,
    models: Vec<String>,
}

impl JudgeClient {
    pub fn new(google: Arc<GoogleClient>) -> Self {
        Self::with_models(google, JUDGE_MODELS.iter().map(|m| m.to_string()).collect())
    }

    /// Override the model chain (an empty chain always classifies as default)
    pub fn with_models(google: Arc<GoogleClient>, models: Vec<String>) -> Self {
        Self { google, models }
    }

    /// Classify a cleaned query; never fails
    pub async fn classify(&self, query: &str) -> Classification {
        let prompt = build_prompt(query);
        for model in &self.models {
            match self.google.generate_content(model, &prompt).await {
                Ok(reply) => match parse_verdict(&reply) {
                    Some(classification) => {
                        debug!(
                            "Judge {}: {} | {}",
                            model, classification.category, classification.language
                        );
                        return classification;
                    }
                    None => debug!("Judge {} returned unparseable verdict", model),
                },
                Err(e) => debug!("Judge {} failed: {}", model, e),
            }
        }
        Classification::default()
    }
}
