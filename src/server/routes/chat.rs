//! Chat completions endpoint
//!
//! The full request pipeline: rate-limit check, query cleaning, state
//! refresh, judge classification, GPU gate, sane-provider computation,
//! routing decision, language enforcement, waterfall execution.

use crate::core::judge::clean_query;
use crate::core::limiter::{BucketClass, GLOBAL_SUBJECT};
use crate::core::providers::{ProviderReply, apply_language_directive};
use crate::core::router;
use crate::core::types::{ChatCompletionRequest, MessageRole};
use crate::core::waterfall::WaterfallExecutor;
use crate::server::routes;
use crate::server::state::AppState;
use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::{HttpResponse, Result as ActixResult, web};
use tracing::{error, info, warn};

/// Value of the `gpu_status` key that admits the local GPU provider
const GPU_GREEN: &str = "GREEN";

/// OpenAI-compatible chat completions endpoint
pub async fn chat_completions(
    state: web::Data<AppState>,
    request: web::Json<ChatCompletionRequest>,
) -> ActixResult<HttpResponse> {
    let request = request.into_inner();
    info!("Chat completion request for model: {}", request.model);

    // Rate limiting first; rejected requests never touch the judge
    let class = BucketClass::for_model(&request.model);
    if !state.limiter.allow(GLOBAL_SUBJECT, class, 1.0).await {
        return Ok(routes::too_many_requests("Rate limit exceeded. Slow down."));
    }

    // Clean question for the judge
    let raw_query = request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::User)
        .map(|m| m.content.clone())
        .unwrap_or_default();
    let query = clean_query(&raw_query);

    // Keep the registry fresh (debounced)
    state.state.refresh(false).await;

    // Judge analysis; failures collapse to the default classification
    let classification = state.judge.classify(&query).await;

    // Hardware gate
    let gpu_ready = state
        .redis
        .get("gpu_status")
        .await
        .unwrap_or_else(|e| {
            warn!("GPU status read failed: {}", e);
            None
        })
        .as_deref()
        == Some(GPU_GREEN);
    state.metrics.gpu_status.set(gpu_ready as i64);

    let registry = state.state.snapshot();
    if registry.is_empty() {
        return Ok(routes::service_unavailable("No providers configured"));
    }
    let sane = state.health.sane_ids(&registry, gpu_ready).await;

    let automatic = router::decide(classification.category, gpu_ready, &sane);
    let preferred = state.routing.read().preferred(automatic);
    info!(
        "Routing: {} | {} -> {} (GPU: {})",
        classification.category,
        classification.language,
        preferred.as_deref().unwrap_or("<none>"),
        gpu_ready
    );

    // Language enforcement, applied once to the shared message array
    let mut messages = request.messages;
    apply_language_directive(&mut messages, &classification.language);

    // Waterfall execution
    let attempts = WaterfallExecutor::ranked(preferred.as_deref(), &sane);
    let executor = WaterfallExecutor {
        registry: &registry,
        health: &state.health,
        http: &state.http,
        google: &state.google,
    };

    match executor
        .execute(&attempts, &messages, request.stream, &request.model)
        .await
    {
        Ok(ProviderReply::Buffered(value)) => Ok(HttpResponse::Ok().json(value)),
        Ok(ProviderReply::Stream(body)) => Ok(HttpResponse::Ok()
            .insert_header((CONTENT_TYPE, "text/event-stream"))
            .insert_header((CACHE_CONTROL, "no-cache"))
            .insert_header(("Connection", "keep-alive"))
            .streaming(body)),
        Err(e) => {
            error!("Waterfall exhausted: {}", e);
            Ok(routes::service_unavailable("All providers failed."))
        }
    }
}
