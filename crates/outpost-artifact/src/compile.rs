//! Client for the model compilation service.
//!
//! Submits a compile job for an uploaded model and waits for the service
//! to produce a device-specific artifact. The compiler itself is opaque:
//! input-shape mismatches and unsupported operators surface verbatim from
//! the service, with no local validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use outpost_core::wait::{WaitOutcome, WaitPlan};
use outpost_core::{CloudConfig, TargetDevice};

use crate::error::{ArtifactError, ArtifactResult};
use crate::store::ObjectUri;

/// A compile job request.
///
/// `target_device` is the family the model will run inference on;
/// `build_target` is the compute environment the compiler itself runs in.
/// They are separate fields on purpose and neither defaults to the other.
#[derive(Debug, Clone, Serialize)]
pub struct CompileRequest {
    /// Location of the model archive in object storage.
    pub model_uri: ObjectUri,
    /// Framework the model was exported from (e.g. "mxnet").
    pub framework: String,
    /// Named input tensor shapes, e.g. `{"data": [1, 3, 224, 224]}`.
    pub input_shapes: BTreeMap<String, Vec<i64>>,
    /// Device family the compiled model runs on.
    pub target_device: TargetDevice,
    /// Compute environment the compilation itself runs in.
    pub build_target: TargetDevice,
    /// Object-storage prefix for the compiled output.
    pub output_prefix: String,
}

/// Status of a compile job as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompileStatus {
    /// Job accepted, not yet started.
    Queued,
    /// Compilation running.
    InProgress,
    /// Compilation finished successfully.
    Completed,
    /// Compilation failed.
    Failed,
}

impl CompileStatus {
    /// Whether this status ends polling.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// The output of a successful compile job.
#[derive(Debug, Clone, Deserialize)]
pub struct CompiledArtifact {
    /// Location of the compiled model archive.
    pub artifact_uri: ObjectUri,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: CompileStatus,
    #[serde(default)]
    failure_reason: Option<String>,
    #[serde(default)]
    artifact_uri: Option<ObjectUri>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// HTTP client for the compile service.
#[derive(Debug, Clone)]
pub struct CompileClient {
    client: reqwest::Client,
    base_url: String,
}

impl CompileClient {
    /// Create a client from cloud configuration.
    pub fn new(config: &CloudConfig) -> ArtifactResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.endpoints.request_timeout_secs,
            ))
            .build()?;

        Ok(Self {
            client,
            base_url: config.endpoints.compile_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Submit a compile job, returning its identifier.
    pub async fn submit(&self, request: &CompileRequest) -> ArtifactResult<String> {
        let url = format!("{}/compilation-jobs", self.base_url);

        debug!(
            model = %request.model_uri,
            target = %request.target_device,
            build = %request.build_target,
            "submitting compile job"
        );

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(err) => err.message,
                Err(_) => "unparseable error response".to_owned(),
            };
            return Err(ArtifactError::CompileRejected(message));
        }

        let submit: SubmitResponse = response.json().await?;
        info!(job_id = %submit.job_id, "compile job submitted");

        Ok(submit.job_id)
    }

    /// Query a compile job's status once.
    pub async fn status(&self, job_id: &str) -> ArtifactResult<(CompileStatus, StatusDetail)> {
        let url = format!("{}/compilation-jobs/{}", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ArtifactError::CompileRejected(format!(
                "status query failed: HTTP {}",
                response.status()
            )));
        }

        let status: StatusResponse = response.json().await?;
        Ok((
            status.status,
            StatusDetail {
                failure_reason: status.failure_reason,
                artifact_uri: status.artifact_uri,
            },
        ))
    }

    /// Block until the job reaches a terminal state.
    ///
    /// Polls through the [`WaitPlan`]; a job still running at the plan's
    /// deadline is a [`ArtifactError::CompileTimeout`], never an unbounded
    /// loop.
    pub async fn wait_complete(
        &self,
        job_id: &str,
        plan: &WaitPlan,
    ) -> ArtifactResult<CompiledArtifact> {
        loop {
            let (status, detail) = self.status(job_id).await?;
            debug!(job_id = %job_id, status = ?status, "compile job status");

            match status {
                CompileStatus::Completed => {
                    let artifact_uri = detail.artifact_uri.ok_or_else(|| {
                        ArtifactError::CompileRejected(
                            "completed job reported no artifact".to_owned(),
                        )
                    })?;
                    info!(job_id = %job_id, artifact = %artifact_uri, "compile job completed");
                    return Ok(CompiledArtifact { artifact_uri });
                }
                CompileStatus::Failed => {
                    return Err(ArtifactError::CompileFailed {
                        job_id: job_id.to_owned(),
                        reason: detail
                            .failure_reason
                            .unwrap_or_else(|| "no reason reported".to_owned()),
                    });
                }
                CompileStatus::Queued | CompileStatus::InProgress => match plan.pause().await {
                    WaitOutcome::Waited => {}
                    WaitOutcome::DeadlineExceeded => {
                        return Err(ArtifactError::CompileTimeout(job_id.to_owned()))
                    }
                    WaitOutcome::Cancelled => {
                        return Err(ArtifactError::CompileCancelled(job_id.to_owned()))
                    }
                },
            }
        }
    }
}

/// Non-status fields of a status report.
#[derive(Debug, Clone)]
pub struct StatusDetail {
    /// Failure reason, present for failed jobs.
    pub failure_reason: Option<String>,
    /// Compiled artifact location, present for completed jobs.
    pub artifact_uri: Option<ObjectUri>,
}
