use crisisbrief_common::{AppConfig, EngineConfig, Result};
use crisisbrief_llm::{EngineCache, OllamaClient, Summarizer};
use crisisbrief_stt::{create_transcriber, Transcriber};
use std::sync::Arc;

use crate::workflow::ReportPipeline;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,

    /// Live summarization adapter, rebuilt when the requested model changes
    pub engines: EngineCache,

    pub transcriber: Arc<dyn Transcriber>,
}

impl AppState {
    /// State backed by Ollama and the configured recognizer
    pub fn new(config: AppConfig) -> Self {
        let engines = ollama_engine_cache(&config);
        let transcriber = create_transcriber(&config);
        Self::with_parts(config, engines, transcriber)
    }

    pub fn with_parts(config: AppConfig, engines: EngineCache, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            config,
            engines,
            transcriber,
        }
    }

    /// Pipeline for `engine`, reusing the cached adapter when possible
    pub async fn pipeline(&self, engine: &EngineConfig) -> Result<ReportPipeline> {
        let summarizer = self.engines.get_or_create(engine).await?;
        Ok(ReportPipeline::new(summarizer, self.transcriber.clone()))
    }

    /// Pipeline for the configured default engine
    pub async fn default_pipeline(&self) -> Result<ReportPipeline> {
        self.pipeline(&self.config.engine_config()).await
    }
}

/// Engine cache whose adapters talk to the configured Ollama server
pub fn ollama_engine_cache(config: &AppConfig) -> EngineCache {
    let base_url = config.ollama_base_url.clone();
    let max_input_tokens = config.max_input_tokens;
    let deadline = config.generation_timeout();

    EngineCache::new(move |engine: &EngineConfig| {
        let client = OllamaClient::new(base_url.clone(), engine)?;
        Ok(Summarizer::new(Arc::new(client), engine.clone())
            .with_max_input_tokens(max_input_tokens)
            .with_deadline(deadline))
    })
}
