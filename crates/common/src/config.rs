use crate::error::CrisisBriefError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix (`CRISISBRIEF_OLLAMA_BASE_URL`, ...)
pub const ENV_PREFIX: &str = "CRISISBRIEF";

/// Summarization engine selection, used as the engine cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Model identifier as known to the engine backend
    pub model: String,

    /// Switch to the alternate model family
    pub use_alternate_family: bool,

    /// Model used when the alternate family is requested
    pub alternate_model: String,
}

impl EngineConfig {
    /// Create a config for the primary model family
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            use_alternate_family: false,
            alternate_model: DEFAULT_ALTERNATE_MODEL.to_string(),
        }
    }

    /// Request the alternate model family
    pub fn with_alternate_family(mut self, enable: bool) -> Self {
        self.use_alternate_family = enable;
        self
    }

    /// Model that will actually be loaded
    ///
    /// A configured model that already belongs to the alternate family is kept.
    pub fn resolved_model(&self) -> &str {
        if !self.use_alternate_family {
            return &self.model;
        }

        let family = self
            .alternate_model
            .split(|c: char| c == ':' || c.is_ascii_digit())
            .next()
            .unwrap_or_default()
            .to_lowercase();

        if !family.is_empty() && self.model.to_lowercase().contains(&family) {
            &self.model
        } else {
            &self.alternate_model
        }
    }
}

const DEFAULT_MODEL: &str = "llama3.2:latest";
const DEFAULT_ALTERNATE_MODEL: &str = "gemma2:2b";

/// CrisisBrief application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Ollama API base URL
    pub ollama_base_url: String,

    /// Summarization model name
    pub summarizer_model: String,

    /// Use the alternate model family instead of `summarizer_model`
    pub use_alternate_model_family: bool,

    /// Alternate family model name
    pub alternate_model: String,

    /// Engine input window in tokens (inputs beyond it are truncated)
    pub max_input_tokens: usize,

    /// Per-call deadline for engine requests, in seconds
    pub generation_timeout_secs: Option<u64>,

    /// Whisper model name or path
    pub whisper_model: String,

    /// Directory holding ggml Whisper models
    pub whisper_models_dir: PathBuf,

    /// Transcription language hint (auto-detect when unset)
    pub whisper_language: Option<String>,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: "http://localhost:11434".to_string(),
            summarizer_model: DEFAULT_MODEL.to_string(),
            use_alternate_model_family: false,
            alternate_model: DEFAULT_ALTERNATE_MODEL.to_string(),
            max_input_tokens: 1024,
            generation_timeout_secs: None,
            whisper_model: "base".to_string(),
            whisper_models_dir: PathBuf::from("./models"),
            whisper_language: None,
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            log_dir: PathBuf::from("./log"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration
    ///
    /// Precedence (lowest first): defaults, optional TOML file,
    /// `CRISISBRIEF_*` environment variables (a `.env` file is read first).
    pub fn load(file: Option<&Path>) -> Result<Self, CrisisBriefError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| CrisisBriefError::config(format!("Failed to read configuration: {}", e)))?;

        let config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| CrisisBriefError::config(format!("Invalid configuration: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Ensure the log directory exists, create if not
    pub fn ensure_directories(&self) -> Result<(), CrisisBriefError> {
        if !self.log_dir.exists() {
            std::fs::create_dir_all(&self.log_dir).map_err(|e| {
                CrisisBriefError::config(format!(
                    "Failed to create directory {}: {}",
                    self.log_dir.display(),
                    e
                ))
            })?;
        }

        Ok(())
    }

    /// Engine cache key for the configured model
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            model: self.summarizer_model.clone(),
            use_alternate_family: self.use_alternate_model_family,
            alternate_model: self.alternate_model.clone(),
        }
    }

    /// Resolve the Whisper model file
    ///
    /// A value that looks like a path is used as is, otherwise the ggml
    /// file name is looked up in `whisper_models_dir`.
    pub fn whisper_model_path(&self) -> PathBuf {
        let candidate = Path::new(&self.whisper_model);
        if candidate.extension().is_some() || candidate.components().count() > 1 {
            return candidate.to_path_buf();
        }
        self.whisper_models_dir
            .join(format!("ggml-{}.bin", self.whisper_model))
    }

    /// Engine deadline as a duration
    pub fn generation_timeout(&self) -> Option<std::time::Duration> {
        self.generation_timeout_secs
            .map(std::time::Duration::from_secs)
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), CrisisBriefError> {
        if self.summarizer_model.trim().is_empty() {
            return Err(CrisisBriefError::config("Summarizer model name cannot be empty"));
        }

        if self.use_alternate_model_family && self.alternate_model.trim().is_empty() {
            return Err(CrisisBriefError::config(
                "Alternate model name cannot be empty when the alternate family is enabled",
            ));
        }

        if self.whisper_model.is_empty() {
            return Err(CrisisBriefError::config("Whisper model name cannot be empty"));
        }

        // Validate Ollama URL
        if !self.ollama_base_url.starts_with("http://")
            && !self.ollama_base_url.starts_with("https://") {
            return Err(CrisisBriefError::config(
                "Ollama base URL must start with http:// or https://"
            ));
        }

        if self.max_input_tokens == 0 {
            return Err(CrisisBriefError::config("max_input_tokens must be positive"));
        }

        // Validate port range
        if self.server_port == 0 {
            return Err(CrisisBriefError::config("Server port cannot be 0"));
        }

        Ok(())
    }
}
