//! Core error types for wellspring-core.
//!
//! This module defines the error hierarchy using thiserror. Session errors
//! are local to one engine instance; nothing here carries global state.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for wellspring-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Session lifecycle errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while starting or driving a guided session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The pattern cannot produce a timeline (no positive phase, zero cycles).
    #[error("Invalid pattern '{pattern_id}': {message}")]
    Configuration { pattern_id: String, message: String },

    /// No catalog entry with the requested id.
    #[error("Unknown pattern: {0}")]
    UnknownPattern(String),

    /// The real-time driver could not obtain a tick source.
    #[error("Tick source unavailable: {0}")]
    TickSourceUnavailable(String),
}

impl SessionError {
    pub(crate) fn configuration(pattern_id: &str, message: impl Into<String>) -> Self {
        SessionError::Configuration {
            pattern_id: pattern_id.to_string(),
            message: message.into(),
        }
    }
}

/// Failure to deliver a tick. Fatal to the session that was waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TickError {
    /// The tick source was closed by its owner.
    #[error("tick source closed")]
    Closed,

    #[error("tick source failed: {0}")]
    Failed(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// The data directory could not be resolved or created
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
