use async_trait::async_trait;
use crisisbrief_common::Result;

use crate::types::ComputeDevice;

/// External abstractive summarization capability
///
/// One request, one response. Implementations may fail; the
/// [`crate::Summarizer`] adapter decides what callers see.
#[async_trait]
pub trait SummarizationEngine: Send + Sync {
    /// Summarize `prompt` into roughly `min_length..=max_length` units
    async fn summarize(
        &self,
        prompt: &str,
        max_length: usize,
        min_length: usize,
        sampling: bool,
    ) -> Result<String>;

    /// Model identifier actually serving requests
    fn model_name(&self) -> &str;

    /// Device chosen when the engine was constructed
    fn device(&self) -> ComputeDevice {
        ComputeDevice::Cpu
    }
}
