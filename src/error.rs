//! Error handling module for winstrap
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Stages decide per variant whether an error is fatal; see `orchestrator`.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for winstrap
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// A config file does not exist (callers fall back to built-in defaults)
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// A config file exists but is not usable structured data
    #[error("Failed to parse {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    /// User input or config value rejected by a validator
    #[error("Validation error: {0}")]
    Validation(String),

    /// An external tool (package manager, PowerShell cmdlet) failed
    #[error("Command failed: {0}")]
    Collaborator(String),

    /// Console input could not be read
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Stage machine misuse
    #[error("Stage transition error: {0}")]
    Stage(String),

    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for winstrap operations
pub type Result<T> = std::result::Result<T, BootstrapError>;

// Convenient error constructors
impl BootstrapError {
    /// Create a config-not-found error
    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        Self::ConfigNotFound(path.as_ref().to_path_buf())
    }

    /// Create a config parse error
    pub fn config_parse(path: impl AsRef<Path>, msg: impl Into<String>) -> Self {
        Self::ConfigParse {
            path: path.as_ref().to_path_buf(),
            message: msg.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a collaborator failure
    pub fn collaborator(msg: impl Into<String>) -> Self {
        Self::Collaborator(msg.into())
    }

    /// Create a prompt error
    pub fn prompt(msg: impl Into<String>) -> Self {
        Self::Prompt(msg.into())
    }

    /// True for errors that only mean "use the defaults"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ConfigNotFound(_))
    }
}
