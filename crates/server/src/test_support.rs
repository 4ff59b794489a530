//! Engine and recognizer doubles shared by the server tests

use async_trait::async_trait;
use crisisbrief_common::{AppConfig, EngineConfig, Result};
use crisisbrief_llm::{EngineCache, SummarizationEngine, Summarizer};
use crisisbrief_stt::{Transcriber, Transcription};
use std::path::Path;
use std::sync::Arc;

use crate::state::AppState;

/// Replies with the word count of the prompt
pub(crate) struct EchoEngine;

#[async_trait]
impl SummarizationEngine for EchoEngine {
    async fn summarize(&self, prompt: &str, _: usize, _: usize, _: bool) -> Result<String> {
        Ok(format!("Summary of {} words", prompt.split_whitespace().count()))
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

pub(crate) fn echo_summarizer() -> Arc<Summarizer> {
    Arc::new(Summarizer::new(Arc::new(EchoEngine), EngineConfig::new("echo")))
}

/// Always returns the same transcript
pub(crate) struct FixedTranscriber(String);

impl FixedTranscriber {
    pub(crate) fn new(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl Transcriber for FixedTranscriber {
    fn transcribe(&self, path: &Path, _language: Option<&str>) -> Result<Transcription> {
        assert!(path.exists());
        Ok(Transcription::from_text(self.0.clone()))
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

pub(crate) fn test_state(transcriber: Arc<dyn Transcriber>) -> Arc<AppState> {
    let engines = EngineCache::new(|engine: &EngineConfig| {
        Ok(Summarizer::new(Arc::new(EchoEngine), engine.clone()))
    });
    Arc::new(AppState::with_parts(AppConfig::default(), engines, transcriber))
}
