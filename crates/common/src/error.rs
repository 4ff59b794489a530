/// CrisisBrief error types
#[derive(Debug, thiserror::Error)]
pub enum CrisisBriefError {
    /// Speech transcription error
    #[error("Transcription error: {0}")]
    Transcription(String),

    /// Summarization engine error
    #[error("Engine error: {0}")]
    Engine(String),

    /// A required external tool or model is not available
    #[error("Missing dependency '{dependency}': {remediation}")]
    DependencyMissing {
        /// Name of the missing tool, library or model
        dependency: String,
        /// Actionable install guidance
        remediation: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error (anyhow integration)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CrisisBriefError {
    /// Create transcription error
    pub fn transcription<S: Into<String>>(msg: S) -> Self {
        Self::Transcription(msg.into())
    }

    /// Create engine error
    pub fn engine<S: Into<String>>(msg: S) -> Self {
        Self::Engine(msg.into())
    }

    /// Create missing-dependency error
    pub fn dependency_missing<D: Into<String>, R: Into<String>>(dependency: D, remediation: R) -> Self {
        Self::DependencyMissing {
            dependency: dependency.into(),
            remediation: remediation.into(),
        }
    }

    /// Create config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }

    /// Create invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this is the missing-dependency condition
    pub fn is_dependency_missing(&self) -> bool {
        matches!(self, Self::DependencyMissing { .. })
    }

    /// Install guidance, only present for missing dependencies
    pub fn remediation(&self) -> Option<&str> {
        match self {
            Self::DependencyMissing { remediation, .. } => Some(remediation),
            _ => None,
        }
    }

    /// Stable machine-readable category
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transcription(_) => "transcription",
            Self::Engine(_) => "engine",
            Self::DependencyMissing { .. } => "dependency_missing",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Other(_) => "other",
        }
    }
}

// HTTP response conversion (used by the server crate)
impl CrisisBriefError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::NotFound(_) => 404,
            Self::DependencyMissing { .. } => 424,
            Self::Config(_) => 500,
            Self::Internal(_) => 500,
            Self::Transcription(_) => 500,
            Self::Engine(_) => 500,
            Self::Network(_) => 503,
            Self::Io(_) => 500,
            Self::Json(_) => 400,
            Self::Other(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_missing_is_distinguishable() {
        let err = CrisisBriefError::dependency_missing("ffmpeg", "sudo apt-get install ffmpeg");
        assert!(err.is_dependency_missing());
        assert_eq!(err.category(), "dependency_missing");
        assert_eq!(err.remediation(), Some("sudo apt-get install ffmpeg"));
        assert_eq!(err.status_code(), 424);

        let generic = CrisisBriefError::transcription("decoder crashed");
        assert!(!generic.is_dependency_missing());
        assert_eq!(generic.remediation(), None);
    }

    #[test]
    fn test_display_embeds_reason() {
        let err = CrisisBriefError::engine("connection refused");
        assert_eq!(err.to_string(), "Engine error: connection refused");
    }
}
