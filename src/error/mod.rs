//! Error types for colloquy.

use thiserror::Error;

/// Primary error type for all colloquy operations.
#[derive(Error, Debug)]
pub enum ColloquyError {
    #[error("Missing credential: {env_var} is not set")]
    MissingCredential { env_var: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid settings file: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("Code execution error: {0}")]
    CodeExecution(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Broad class of a failure, following where it originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Raised before any network call.
    Configuration,
    /// DNS, connection, or timeout failures.
    Transport,
    /// Non-success responses from the remote service.
    Remote,
    /// Local I/O, execution, or lifecycle failures.
    Local,
}

impl ColloquyError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Missing credential for the given environment variable.
    pub fn missing_credential(env_var: impl Into<String>) -> Self {
        Self::MissingCredential {
            env_var: env_var.into(),
        }
    }

    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingCredential { .. } | Self::Configuration(_) | Self::Settings(_) => {
                ErrorCategory::Configuration
            }
            Self::Network(_) => ErrorCategory::Transport,
            Self::Api { .. } | Self::Authentication(_) | Self::Serialization(_) => {
                ErrorCategory::Remote
            }
            Self::Io(_) | Self::CodeExecution(_) | Self::InvalidState(_) => ErrorCategory::Local,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ColloquyError>;
