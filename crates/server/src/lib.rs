//! CrisisBrief HTTP server
//!
//! Actix-web REST API over the summarization and transcription pipeline

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use crisisbrief_common::{AppConfig, Result};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub mod error;
pub mod routes;
pub mod state;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod test_support;

pub use error::{ApiError, ApiResult};
pub use state::{ollama_engine_cache, AppState};
pub use workflow::{AudioOutputs, PipelineOutputs, ReportPipeline};

/// JSON bodies carry whole reports
const JSON_LIMIT: usize = 4 * 1024 * 1024;

/// Start the server with Ollama and the configured recognizer
pub async fn start_server(config: AppConfig) -> Result<()> {
    let bind_addr = config.server_bind_address();
    let state = Arc::new(AppState::new(config));
    run_server(state, &bind_addr).await
}

/// Serve `state` on `bind_addr` until shutdown
pub async fn run_server(state: Arc<AppState>, bind_addr: &str) -> Result<()> {
    info!("Starting HTTP server on http://{}", bind_addr);
    let data = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .app_data(data.clone())
            .app_data(web::JsonConfig::default().limit(JSON_LIMIT))
            .configure(routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    info!("HTTP server stopped");
    Ok(())
}
