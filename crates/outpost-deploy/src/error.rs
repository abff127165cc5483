//! Error types for deployment monitoring.

/// Result type alias using [`DeployError`].
pub type DeployResult<T> = Result<T, DeployError>;

/// Errors that can occur while creating or monitoring a deployment.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The deployment reached its failed terminal state.
    ///
    /// Terminal: polling stops immediately and the workflow aborts with
    /// no automatic retry.
    #[error("deployment {deployment_id} failed: {reason}")]
    Failed {
        /// Deployment identifier.
        deployment_id: String,
        /// Failure reason reported by the service.
        reason: String,
    },

    /// The deployment did not reach a terminal state before the deadline.
    #[error("deployment {0} still in progress at deadline")]
    Timeout(String),

    /// Monitoring was cancelled.
    #[error("deployment {0} monitoring cancelled")]
    Cancelled(String),

    /// The deployment service rejected a request.
    #[error("deployment service error (HTTP {status}): {message}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Service-provided message.
        message: String,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DeployError {
    /// Create a service error.
    #[must_use]
    pub fn service(status: u16, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }
}
