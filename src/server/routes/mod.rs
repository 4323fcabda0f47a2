//! HTTP route modules

pub mod chat;
pub mod metrics;
pub mod models;

use actix_web::{HttpResponse, web};
use serde::Serialize;

/// Terse error body; internal details never reach clients
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub(crate) fn too_many_requests(message: &str) -> HttpResponse {
    HttpResponse::TooManyRequests().json(ErrorBody {
        error: message.to_string(),
    })
}

pub(crate) fn service_unavailable(message: &str) -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(ErrorBody {
        error: message.to_string(),
    })
}

/// Register all gateway routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/v1/chat/completions",
        web::post().to(chat::chat_completions),
    )
    .route("/v1/models", web::get().to(models::list_models))
    .route("/metrics", web::get().to(metrics::metrics));
}
