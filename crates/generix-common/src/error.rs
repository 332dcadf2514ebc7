//! Error types shared across Generix crates

use thiserror::Error;

/// Result type alias for shared Generix operations
pub type Result<T> = std::result::Result<T, GenerixError>;

/// Errors raised outside a single component's own domain, mostly while
/// loading configuration.
#[derive(Error, Debug)]
pub enum GenerixError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration file: {0}")]
    ConfigFile(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GenerixError {
    pub fn config(message: impl Into<String>) -> Self {
        GenerixError::Config(message.into())
    }
}
