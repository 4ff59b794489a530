pub mod config;
pub mod error;
pub mod logger;

// Re-export commonly used types
pub use config::{AppConfig, EngineConfig};
pub use error::CrisisBriefError;
pub type Result<T> = std::result::Result<T, CrisisBriefError>;
