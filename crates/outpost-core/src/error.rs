//! Error types for outpost-core.

/// Result type alias using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the shared layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Configuration loading or validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required configuration value is missing.
    #[error("missing configuration value: {0}")]
    MissingValue(&'static str),
}

impl CoreError {
    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
