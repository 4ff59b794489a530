use actix_web::{get, web, HttpResponse};
use std::sync::Arc;

use crate::state::AppState;
use crate::types::HealthResponse;

#[get("/health")]
pub async fn health(state: web::Data<Arc<AppState>>) -> actix_web::Result<HttpResponse> {
    let model = match state.engines.current_config().await {
        Some(engine) => engine.resolved_model().to_string(),
        None => state.config.engine_config().resolved_model().to_string(),
    };

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        model,
        transcriber: state.transcriber.name().to_string(),
    }))
}
