use async_trait::async_trait;
use crisisbrief_common::{CrisisBriefError, EngineConfig, Result};
use reqwest::Client;
use tracing::{debug, info};

use crate::llm_trait::SummarizationEngine;
use crate::types::{ComputeDevice, GenerateOptions, GenerateRequest, GenerateResponse};

/// Seed used whenever sampling is off
const DETERMINISTIC_SEED: i64 = 42;

/// Ollama API client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    device: ComputeDevice,
    max_retries: u32,
    client: Client,
}

impl OllamaClient {
    /// Create new Ollama client for an engine configuration
    pub fn new(base_url: impl Into<String>, engine: &EngineConfig) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300)) // 5 minutes for LLM calls
            .build()
            .map_err(|e| CrisisBriefError::network(format!("Failed to create HTTP client: {}", e)))?;

        let model = engine.resolved_model().to_string();
        let device = ComputeDevice::detect();

        info!("Ollama client initialized: {} (model: {}, device: {:?})", base_url, model, device);
        Ok(Self {
            base_url,
            model,
            device,
            max_retries: 3,
            client,
        })
    }

    /// Override the number of attempts per request
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Ollama generate request for one summarization call
    pub fn build_request(
        &self,
        prompt: &str,
        max_length: usize,
        min_length: usize,
        sampling: bool,
    ) -> GenerateRequest {
        let prompt = format!(
            "Summarize the following text in your own words, using between {} and {} words. Reply with the summary only.\n\n{}\n\nSummary:",
            min_length, max_length, prompt
        );

        let (temperature, top_p, seed) = if sampling {
            (0.7, Some(0.9), None)
        } else {
            (0.0, None, Some(DETERMINISTIC_SEED))
        };

        GenerateRequest {
            model: self.model.clone(),
            prompt,
            stream: Some(false),
            options: Some(GenerateOptions {
                temperature: Some(temperature),
                top_p,
                num_predict: Some(i32::try_from(max_length.saturating_mul(2)).unwrap_or(i32::MAX)),
                seed,
                num_gpu: (!self.device.is_accelerated()).then_some(0),
            }),
        }
    }

    /// Generate text with Ollama (with retry logic)
    pub async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        debug!(
            "Sending generate request to Ollama - Model: {}, Prompt length: {}",
            request.model,
            request.prompt.len()
        );

        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.try_generate(&url, &request).await {
                Ok(response) => {
                    debug!("Received response from Ollama - Length: {}", response.len());
                    return Ok(response);
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        let delay = std::time::Duration::from_secs(2u64.pow(attempt - 1));
                        tracing::warn!(
                            "Ollama request failed (attempt {}/{}): {}. Retrying in {:?}...",
                            attempt,
                            self.max_retries,
                            e,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CrisisBriefError::engine("All retries failed")))
    }

    /// Single attempt to generate text
    async fn try_generate(&self, url: &str, request: &GenerateRequest) -> Result<String> {
        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CrisisBriefError::network(format!("Failed to send request: {}", e)))?
            .error_for_status()
            .map_err(|e| CrisisBriefError::engine(format!("Ollama API error: {}", e)))?;

        let result: GenerateResponse = response.json().await
            .map_err(|e| CrisisBriefError::engine(format!("Failed to parse response: {}", e)))?;

        if result.response.trim().is_empty() {
            return Err(CrisisBriefError::engine(format!(
                "Empty response from Ollama model {}",
                result.model
            )));
        }

        Ok(result.response)
    }

    /// Test connection to Ollama
    pub async fn test_connection(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().await
            .map_err(|e| CrisisBriefError::network(format!("Failed to connect to Ollama: {}", e)))?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl SummarizationEngine for OllamaClient {
    async fn summarize(
        &self,
        prompt: &str,
        max_length: usize,
        min_length: usize,
        sampling: bool,
    ) -> Result<String> {
        let request = self.build_request(prompt, max_length, min_length, sampling);
        self.generate(request).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn device(&self) -> ComputeDevice {
        self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OllamaClient {
        OllamaClient::new("http://localhost:11434/", &EngineConfig::new("llama3.2")).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = client();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.model_name(), "llama3.2");
    }

    #[test]
    fn test_alternate_family_resolves_model() {
        let engine = EngineConfig::new("llama3.2").with_alternate_family(true);
        let client = OllamaClient::new("http://localhost:11434", &engine).unwrap();
        assert_eq!(client.model_name(), "gemma2:2b");
    }

    #[test]
    fn test_deterministic_request_options() {
        let request = client().build_request("Flood waters rose overnight.", 20, 8, false);
        let options = request.options.unwrap();
        assert_eq!(options.temperature, Some(0.0));
        assert_eq!(options.seed, Some(DETERMINISTIC_SEED));
        assert_eq!(options.num_predict, Some(40));
        assert!(options.top_p.is_none());
        assert!(request.prompt.contains("between 8 and 20 words"));
        assert!(request.prompt.contains("Flood waters rose overnight."));
        assert_eq!(request.stream, Some(false));
    }

    #[test]
    fn test_sampling_request_options() {
        let request = client().build_request("text", 60, 25, true);
        let options = request.options.unwrap();
        assert_eq!(options.temperature, Some(0.7));
        assert!(options.seed.is_none());
    }

    #[test]
    fn test_cpu_build_pins_cpu() {
        let client = client();
        let options = client.build_request("text", 20, 8, false).options.unwrap();
        if client.device() == ComputeDevice::Cpu {
            assert_eq!(options.num_gpu, Some(0));
        } else {
            assert!(options.num_gpu.is_none());
        }
    }
}
