use crisisbrief_common::{CrisisBriefError, Result};
use serde::{Deserialize, Serialize};

use crate::prompts::{AbstractionLevel, AudienceRole};

/// Ollama generate request
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    /// Model name (e.g., "llama3.2", "gemma2")
    pub model: String,

    /// Prompt text
    pub prompt: String,

    /// Disable streaming
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,

    /// Generation options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
}

/// Generation options
#[derive(Debug, Clone, Serialize, Default)]
pub struct GenerateOptions {
    /// Temperature (0.0 - 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Top-p sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,

    /// Fixed seed for reproducible output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,

    /// Layers offloaded to the GPU (0 = CPU only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_gpu: Option<i32>,
}

/// Ollama generate response
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    /// Model name
    pub model: String,

    /// Generated text
    pub response: String,

    /// Whether generation is complete
    pub done: bool,
}

/// Compute device the engine runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComputeDevice {
    /// NVIDIA GPU via CUDA
    Cuda,
    /// Apple GPU via Metal
    Metal,
    /// CPU execution
    Cpu,
}

impl ComputeDevice {
    /// Resolve the device from compile-time features (CUDA > Metal > CPU)
    pub fn detect() -> Self {
        if cfg!(feature = "cuda") {
            Self::Cuda
        } else if cfg!(feature = "metal") {
            Self::Metal
        } else {
            Self::Cpu
        }
    }

    pub fn is_accelerated(&self) -> bool {
        !matches!(self, Self::Cpu)
    }
}

/// One bounded generation call
///
/// Built per call and consumed by [`crate::Summarizer::run`].
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub source_text: String,
    pub max_length: usize,
    pub min_length: usize,
    pub sampling_enabled: bool,
    pub audience_role: Option<AudienceRole>,
    pub abstraction_level: Option<AbstractionLevel>,
}

impl GenerationRequest {
    /// Plain request without audience guidance
    ///
    /// A `min_length` above `max_length` is clamped down to it. Use
    /// [`GenerationRequest::try_new`] for bounds that come from user input.
    pub fn new(source_text: impl Into<String>, min_length: usize, max_length: usize) -> Self {
        Self {
            source_text: source_text.into(),
            max_length,
            min_length: min_length.min(max_length),
            sampling_enabled: false,
            audience_role: None,
            abstraction_level: None,
        }
    }

    /// Plain request, rejecting a zero or inverted length range
    pub fn try_new(source_text: impl Into<String>, min_length: usize, max_length: usize) -> Result<Self> {
        if max_length == 0 {
            return Err(CrisisBriefError::invalid_input("max_length must be greater than zero"));
        }
        if min_length > max_length {
            return Err(CrisisBriefError::invalid_input(format!(
                "min_length ({}) must not exceed max_length ({})",
                min_length, max_length
            )));
        }
        Ok(Self::new(source_text, min_length, max_length))
    }

    /// Steer the request toward an audience and abstraction level
    pub fn for_audience(mut self, role: AudienceRole, level: AbstractionLevel) -> Self {
        self.audience_role = Some(role);
        self.abstraction_level = Some(level);
        self
    }

    /// Enable or disable sampling (disabled means deterministic)
    pub fn with_sampling(mut self, enabled: bool) -> Self {
        self.sampling_enabled = enabled;
        self
    }
}

/// Alert, operational and strategic outputs of one multi-level run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTriple {
    /// One-line public alert
    pub alert: String,

    /// Operational brief for responders
    pub operational: String,

    /// Strategic summary for authorities
    pub strategic: String,
}

impl SummaryTriple {
    pub fn new(alert: String, operational: String, strategic: String) -> Self {
        Self {
            alert,
            operational,
            strategic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_skip_unset_fields() {
        let options = GenerateOptions {
            temperature: Some(0.0),
            num_gpu: Some(0),
            ..Default::default()
        };
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["temperature"], 0.0);
        assert_eq!(json["num_gpu"], 0);
        assert!(json.get("top_p").is_none());
        assert!(json.get("seed").is_none());
    }

    #[test]
    fn test_generation_request_defaults_to_plain_mode() {
        let request = GenerationRequest::new("text", 8, 20);
        assert!(request.audience_role.is_none());
        assert!(request.abstraction_level.is_none());
        assert!(!request.sampling_enabled);
    }

    #[test]
    fn test_inverted_bounds() {
        let err = GenerationRequest::try_new("text", 200, 50).unwrap_err();
        assert_eq!(err.category(), "invalid_input");
        assert!(GenerationRequest::try_new("text", 0, 0).is_err());
        assert_eq!(GenerationRequest::try_new("text", 30, 130).unwrap().min_length, 30);

        let clamped = GenerationRequest::new("text", 200, 50);
        assert_eq!((clamped.min_length, clamped.max_length), (50, 50));
    }

    #[test]
    fn test_cpu_build_is_not_accelerated() {
        if !cfg!(feature = "cuda") && !cfg!(feature = "metal") {
            assert_eq!(ComputeDevice::detect(), ComputeDevice::Cpu);
            assert!(!ComputeDevice::detect().is_accelerated());
        }
    }
}
