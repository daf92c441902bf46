//! Error types for agent orchestration

use thiserror::Error;

/// Main error type for lycan operations
#[derive(Error, Debug)]
pub enum LycanError {
    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Personality outside the closed set
    #[error("Unknown personality: {0}")]
    UnknownPersonality(String),

    /// The generation backend failed at runtime
    #[error("Generation error: {0}")]
    Generation(String),

    /// No generation backend could be built
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// No live agent with this identity
    #[error("Agent '{0}' not found")]
    AgentNotFound(String),

    /// Operator command could not be parsed
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for LycanError {
    fn from(err: serde_json::Error) -> Self {
        LycanError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for LycanError {
    fn from(err: toml::de::Error) -> Self {
        LycanError::Configuration(err.to_string())
    }
}

/// Result type alias for lycan operations
pub type LycanResult<T> = Result<T, LycanError>;
