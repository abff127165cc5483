//! Deployment service API surface.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use outpost_core::{CloudConfig, DeploymentId, GroupId};

use crate::error::{DeployError, DeployResult};
use crate::state::DeploymentStatus;

/// One status observation for a deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusReport {
    /// Current rollout status.
    pub status: DeploymentStatus,
    /// Failure detail, present when the status is failed.
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Operations the deployment service exposes.
#[async_trait]
pub trait DeploymentApi: Send + Sync {
    /// Create a deployment of a group version.
    async fn create_deployment(
        &self,
        group_id: &GroupId,
        group_version_id: &str,
    ) -> DeployResult<DeploymentId>;

    /// Query a deployment's rollout status once.
    async fn deployment_status(
        &self,
        group_id: &GroupId,
        deployment_id: &DeploymentId,
    ) -> DeployResult<StatusReport>;
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    deployment_id: DeploymentId,
}

/// HTTP client for the deployment service.
#[derive(Debug, Clone)]
pub struct HttpDeploymentApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDeploymentApi {
    /// Create a client from cloud configuration.
    pub fn new(config: &CloudConfig) -> DeployResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.endpoints.request_timeout_secs))
            .build()
            .map_err(DeployError::Http)?;

        Ok(Self {
            client,
            base_url: config.endpoints.fleet_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> DeployResult<T> {
        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(DeployError::Http);
        }

        let message = match response.json::<ServiceError>().await {
            Ok(err) => err.message,
            Err(_) => "unparseable error response".to_owned(),
        };
        Err(DeployError::service(status.as_u16(), message))
    }
}

#[async_trait]
impl DeploymentApi for HttpDeploymentApi {
    async fn create_deployment(
        &self,
        group_id: &GroupId,
        group_version_id: &str,
    ) -> DeployResult<DeploymentId> {
        debug!(group_id = %group_id, version = %group_version_id, "creating deployment");

        let url = format!("{}/groups/{}/deployments", self.base_url, group_id.as_str());
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "group_version_id": group_version_id,
                "deployment_type": "NewDeployment",
            }))
            .send()
            .await?;

        let created: CreateResponse = Self::parse(response).await?;
        Ok(created.deployment_id)
    }

    async fn deployment_status(
        &self,
        group_id: &GroupId,
        deployment_id: &DeploymentId,
    ) -> DeployResult<StatusReport> {
        let url = format!(
            "{}/groups/{}/deployments/{}/status",
            self.base_url,
            group_id.as_str(),
            deployment_id.as_str()
        );
        let response = self.client.get(&url).send().await?;
        Self::parse(response).await
    }
}

#[derive(Debug, Default)]
struct ScriptState {
    script: VecDeque<StatusReport>,
    last: Option<StatusReport>,
    status_calls: usize,
}

/// Test double replaying a fixed status sequence.
///
/// Pops one report per status query; once the script is exhausted the
/// last report repeats, so a non-terminal tail models a deployment stuck
/// in progress.
#[derive(Debug, Default)]
pub struct ScriptedDeployApi {
    state: Mutex<ScriptState>,
}

impl ScriptedDeployApi {
    /// Create a double from a status sequence.
    #[must_use]
    pub fn new(statuses: impl IntoIterator<Item = DeploymentStatus>) -> Self {
        let script = statuses
            .into_iter()
            .map(|status| {
                let error_message = match status {
                    DeploymentStatus::Failed => Some("scripted failure".to_owned()),
                    _ => None,
                };
                StatusReport {
                    status,
                    error_message,
                }
            })
            .collect();

        Self {
            state: Mutex::new(ScriptState {
                script,
                last: None,
                status_calls: 0,
            }),
        }
    }

    /// How many status queries have been made.
    pub fn status_calls(&self) -> usize {
        self.state.lock().map(|s| s.status_calls).unwrap_or(0)
    }
}

#[async_trait]
impl DeploymentApi for ScriptedDeployApi {
    async fn create_deployment(
        &self,
        _group_id: &GroupId,
        _group_version_id: &str,
    ) -> DeployResult<DeploymentId> {
        Ok(DeploymentId::generate())
    }

    async fn deployment_status(
        &self,
        _group_id: &GroupId,
        _deployment_id: &DeploymentId,
    ) -> DeployResult<StatusReport> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| DeployError::Internal("lock poisoned".to_owned()))?;

        state.status_calls += 1;

        let report = match state.script.pop_front() {
            Some(report) => {
                state.last = Some(report.clone());
                report
            }
            None => state
                .last
                .clone()
                .ok_or_else(|| DeployError::Internal("empty status script".to_owned()))?,
        };

        Ok(report)
    }
}
