use thiserror::Error;

/// Unified error type for version-stamper operations
#[derive(Error, Debug)]
pub enum StamperError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Backup failed: {0}")]
    Backup(String),

    #[error("Rewrite failed: {0}")]
    Rewrite(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in version-stamper
pub type Result<T> = std::result::Result<T, StamperError>;

impl StamperError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        StamperError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        StamperError::Version(msg.into())
    }

    /// Create a backup error with context
    pub fn backup(msg: impl Into<String>) -> Self {
        StamperError::Backup(msg.into())
    }

    /// Create a rewrite error with context
    pub fn rewrite(msg: impl Into<String>) -> Self {
        StamperError::Rewrite(msg.into())
    }
}
