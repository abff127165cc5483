//! Error types for fleet provisioning.

use std::path::PathBuf;

/// Result type alias using [`FleetError`].
pub type FleetResult<T> = Result<T, FleetError>;

/// Errors that can occur while provisioning a fleet group.
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    /// The fleet service rejected a request.
    ///
    /// The service's status and message are carried verbatim; bad input,
    /// quota, and permission failures all arrive through here.
    #[error("fleet service error (HTTP {status}): {message}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Service-provided message.
        message: String,
    },

    /// A provisioning step failed partway through the chain.
    ///
    /// Earlier steps' side effects remain and must be cleaned up
    /// out-of-band; the step name says where the chain stopped.
    #[error("provisioning failed at step '{step}': {source}")]
    Provision {
        /// Name of the failed step.
        step: &'static str,
        /// Underlying error.
        #[source]
        source: Box<FleetError>,
    },

    /// The function's local inference service name does not match the
    /// connector's `LocalInferenceServiceName` parameter.
    ///
    /// Deploying such a pair installs cleanly and then fails at runtime
    /// on-device, so the mismatch is rejected before composition.
    #[error(
        "service name mismatch: function declares '{function}', connector declares '{connector}'"
    )]
    ServiceNameMismatch {
        /// Name declared by the function definition.
        function: String,
        /// Name declared by the connector parameters.
        connector: String,
    },

    /// Refusing to overwrite existing private key material.
    ///
    /// There is no regeneration path for a lost key, so an existing key
    /// file is never clobbered.
    #[error("private key already exists: {0}")]
    PrivateKeyExists(PathBuf),

    /// The provisioning manifest lacks an identifier this stage needs.
    #[error("manifest is missing '{0}'; run the earlier workflow stages first")]
    ManifestIncomplete(&'static str),

    /// The provisioning manifest file was not found.
    #[error("manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialisation error.
    #[error("serialisation error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FleetError {
    /// Create a service error.
    #[must_use]
    pub fn service(status: u16, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Wrap an error with the provisioning step it occurred in.
    #[must_use]
    pub fn at_step(step: &'static str) -> impl FnOnce(Self) -> Self {
        move |source| Self::Provision {
            step,
            source: Box::new(source),
        }
    }
}
