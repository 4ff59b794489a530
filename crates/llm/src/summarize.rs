use crisisbrief_common::{CrisisBriefError, EngineConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info_span, Instrument, Span};

use crate::llm_trait::SummarizationEngine;
use crate::prompts::build_prompt;
use crate::truncate::{truncate_to_budget, DEFAULT_MAX_INPUT_TOKENS};
use crate::types::{ComputeDevice, GenerationRequest};

/// Returned instead of calling the engine on blank input
pub const EMPTY_INPUT_SENTINEL: &str = "No text provided for summarization.";

/// Prefix of every degraded (failed) generation
pub const ERROR_PREFIX: &str = "Error generating summary:";

/// Whether a generated string is a degraded placeholder
pub fn is_degraded(text: &str) -> bool {
    text.starts_with(ERROR_PREFIX) || text == EMPTY_INPUT_SENTINEL
}

/// Adapter over a [`SummarizationEngine`]
///
/// Truncates oversized input, skips blank input and turns every engine
/// failure into a descriptive string so one bad call never aborts a report.
pub struct Summarizer {
    engine: Arc<dyn SummarizationEngine>,
    config: EngineConfig,
    device: ComputeDevice,
    max_input_tokens: usize,
    deadline: Option<Duration>,
    span: Span,
}

impl Summarizer {
    /// Create new summarizer
    pub fn new(engine: Arc<dyn SummarizationEngine>, config: EngineConfig) -> Self {
        let device = engine.device();
        let span = info_span!("summarizer", model = %engine.model_name(), device = ?device);
        Self {
            engine,
            config,
            device,
            max_input_tokens: DEFAULT_MAX_INPUT_TOKENS,
            deadline: None,
            span,
        }
    }

    /// Set the engine input window in tokens
    pub fn with_max_input_tokens(mut self, max_input_tokens: usize) -> Self {
        self.max_input_tokens = max_input_tokens.max(1);
        self
    }

    /// Bound every engine call; expiry degrades like any other failure
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Configuration this adapter was built from
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn model_name(&self) -> &str {
        self.engine.model_name()
    }

    pub fn device(&self) -> ComputeDevice {
        self.device
    }

    pub fn max_input_tokens(&self) -> usize {
        self.max_input_tokens
    }

    /// Span owned by this adapter, for child components
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Generate a bounded-length summary for `text`
    ///
    /// Always returns a trimmed string: the summary, the empty-input
    /// sentinel, or an error description.
    pub async fn generate(
        &self,
        text: &str,
        max_length: usize,
        min_length: usize,
        sampling: bool,
    ) -> String {
        if text.trim().is_empty() {
            return EMPTY_INPUT_SENTINEL.to_string();
        }

        let input = truncate_to_budget(text, self.max_input_tokens);

        async {
            debug!(
                "Generating summary - input: {} chars, bounds: {}..={}",
                input.len(),
                min_length,
                max_length
            );

            match self.call_engine(&input, max_length, min_length, sampling).await {
                Ok(summary) => summary.trim().to_string(),
                Err(e) => {
                    error!("Error during summarization: {}", e);
                    format!("{} {}", ERROR_PREFIX, e)
                }
            }
        }
        .instrument(self.span.clone())
        .await
    }

    /// Run a guided (or plain) generation request
    pub async fn run(&self, request: &GenerationRequest) -> String {
        if request.source_text.trim().is_empty() {
            return EMPTY_INPUT_SENTINEL.to_string();
        }

        let prompt = build_prompt(
            &request.source_text,
            request.audience_role,
            request.abstraction_level,
            self.max_input_tokens,
        );

        self.generate(
            &prompt,
            request.max_length,
            request.min_length,
            request.sampling_enabled,
        )
        .await
    }

    async fn call_engine(
        &self,
        input: &str,
        max_length: usize,
        min_length: usize,
        sampling: bool,
    ) -> crisisbrief_common::Result<String> {
        let call = self.engine.summarize(input, max_length, min_length, sampling);

        match self.deadline {
            None => call.await,
            Some(deadline) => tokio::time::timeout(deadline, call)
                .await
                .map_err(|_| CrisisBriefError::engine(format!("deadline of {:?} exceeded", deadline)))?,
        }
    }
}
