//! Shared error types for the crate

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for archmap operations
#[derive(Debug, Error)]
pub enum Error {
    /// Semantic model contract violations
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed graph edges
    #[error("Edge error from '{from}' to '{to}': {message}")]
    Edge {
        from: String,
        to: String,
        message: String,
    },

    /// Analysis errors
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Configuration file access errors
    #[error("Config file error: {message}")]
    ConfigFile {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// Wrapped external errors
    #[error(transparent)]
    External(#[from] anyhow::Error),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Pattern errors
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

impl Error {
    /// Create an edge contract error
    pub fn edge(from: impl Into<String>, to: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Edge {
            from: from.into(),
            to: to.into(),
            message: message.into(),
        }
    }

    /// Create a config file error with path context
    pub fn config_file(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::ConfigFile {
            message: message.into(),
            path: Some(path.into()),
            source: None,
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}
