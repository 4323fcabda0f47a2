//! Model listing endpoint

use crate::core::types::ModelList;
use crate::server::state::AppState;
use actix_web::{HttpResponse, Result as ActixResult, web};

/// List available models
///
/// The gateway advertises a single virtual model; the real upstream model is
/// chosen per request by the router.
pub async fn list_models(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ModelList::single(state.config.virtual_model.clone())))
}
