use actix_web::{post, web, HttpResponse};
use std::sync::Arc;
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::types::SummariesRequest;

/// Summaries for posted text
///
/// The request may pick another model or the alternate model family; the
/// engine cache only rebuilds the adapter when that choice changes.
#[post("/summaries")]
pub async fn summaries(
    req: web::Json<SummariesRequest>,
    state: web::Data<Arc<AppState>>,
) -> ApiResult<HttpResponse> {
    let req = req.into_inner();

    let mut engine = state.config.engine_config();
    if let Some(model) = req.model.filter(|m| !m.trim().is_empty()) {
        engine.model = model;
    }
    if let Some(alternate) = req.use_alternate_model_family {
        engine.use_alternate_family = alternate;
    }

    info!(
        "Summaries requested: {} chars, structured: {}, model: {}",
        req.text.len(),
        req.structured,
        engine.resolved_model()
    );

    let pipeline = state.pipeline(&engine).await?;
    let outputs = pipeline.summarize(&req.text, req.structured).await;

    Ok(HttpResponse::Ok().json(outputs))
}
