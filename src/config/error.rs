//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid port number for {0}")]
    InvalidPort(&'static str),

    #[error("WebSocket and HTTP servers cannot share port {0}")]
    PortConflict(u16),

    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Static file root is not a directory: {0}")]
    StaticRootMissing(String),
}
