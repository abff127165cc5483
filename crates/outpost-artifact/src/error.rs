//! Error types for artifact preparation.

use std::path::PathBuf;

/// Result type alias using [`ArtifactError`].
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Errors that can occur while preparing or compiling model artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// A source file to archive or upload does not exist.
    ///
    /// Distinct from [`ArtifactError::Io`] so callers can branch on the
    /// missing-input case without string matching.
    #[error("source file not found: {0}")]
    SourceMissing(PathBuf),

    /// Archive creation or extraction failed.
    #[error("archive error: {0}")]
    Archive(String),

    /// Upload to object storage failed.
    #[error("upload failed for key '{key}': {source}")]
    Upload {
        /// Object key that failed.
        key: String,
        /// Underlying object-store error.
        source: object_store::Error,
    },

    /// Download from object storage failed.
    #[error("download failed for key '{key}': {source}")]
    Download {
        /// Object key that failed.
        key: String,
        /// Underlying object-store error.
        source: object_store::Error,
    },

    /// Object-store client construction failed.
    #[error("failed to create object store: {0}")]
    StoreCreation(String),

    /// Invalid object path.
    #[error("invalid object path: {0}")]
    InvalidPath(String),

    /// Model fetch over HTTP failed.
    #[error("model fetch failed for {url}: {message}")]
    Fetch {
        /// URL that failed.
        url: String,
        /// Error detail.
        message: String,
    },

    /// The compile service rejected the request.
    ///
    /// The service's message is carried verbatim; outpost performs no
    /// local validation of input shapes or operator support.
    #[error("compile request rejected: {0}")]
    CompileRejected(String),

    /// The compile job reached its failed terminal state.
    #[error("compile job {job_id} failed: {reason}")]
    CompileFailed {
        /// Job identifier.
        job_id: String,
        /// Failure reason reported by the service.
        reason: String,
    },

    /// The compile job did not finish before the polling deadline.
    #[error("compile job {0} timed out")]
    CompileTimeout(String),

    /// Waiting for the compile job was cancelled.
    #[error("compile job {0} wait cancelled")]
    CompileCancelled(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
