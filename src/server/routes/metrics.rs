//! Prometheus exposition endpoint
//!
//! Gauge refreshes happen in the metrics middleware so they run on every
//! scrape regardless of handler outcome.

use crate::server::state::AppState;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpResponse, Result as ActixResult, web};
use tracing::error;

/// Render the metrics registry in text exposition format
pub async fn metrics(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    match state.metrics.encode() {
        Ok(text) => Ok(HttpResponse::Ok()
            .insert_header((CONTENT_TYPE, "text/plain; version=0.0.4"))
            .body(text)),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}
