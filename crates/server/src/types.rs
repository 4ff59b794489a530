use serde::{Deserialize, Serialize};

/// `POST /summaries` body
#[derive(Debug, Deserialize)]
pub struct SummariesRequest {
    pub text: String,

    /// Structured report instead of the strategic summary
    #[serde(default)]
    pub structured: bool,

    /// Model override
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub use_alternate_model_family: Option<bool>,
}

/// `POST /audio` query
#[derive(Debug, Default, Deserialize)]
pub struct AudioQuery {
    #[serde(default)]
    pub structured: bool,

    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Model of the live adapter (or the configured default)
    pub model: String,
    pub transcriber: String,
}
