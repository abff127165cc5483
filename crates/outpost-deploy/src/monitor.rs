//! Deployment status polling.

use std::sync::Arc;

use tracing::{debug, error, info};

use outpost_core::wait::{WaitOutcome, WaitPlan};
use outpost_core::{DeploymentId, GroupId};

use crate::api::DeploymentApi;
use crate::error::{DeployError, DeployResult};
use crate::state::{Deployment, DeploymentStatus, Requested, Succeeded};

/// Creates a deployment and polls its rollout to a terminal state.
pub struct DeploymentMonitor {
    api: Arc<dyn DeploymentApi>,
}

impl DeploymentMonitor {
    /// Create a monitor.
    #[must_use]
    pub fn new(api: Arc<dyn DeploymentApi>) -> Self {
        Self { api }
    }

    /// Create a deployment for a group version and wait for its rollout.
    ///
    /// Returns the succeeded deployment, or:
    /// - [`DeployError::Failed`] as soon as the service reports failure,
    ///   with no further polling;
    /// - [`DeployError::Timeout`] when the wait plan's deadline passes
    ///   with the rollout still in progress;
    /// - [`DeployError::Cancelled`] when the plan's token fires.
    pub async fn run(
        &self,
        group_id: &GroupId,
        group_version_id: &str,
        plan: &WaitPlan,
    ) -> DeployResult<Deployment<Succeeded>> {
        let deployment_id = self
            .api
            .create_deployment(group_id, group_version_id)
            .await?;

        info!(
            group_id = %group_id,
            deployment_id = %deployment_id,
            "deployment created"
        );

        let requested = Deployment::<Requested>::new(deployment_id);
        self.watch(group_id, requested, plan).await
    }

    /// Poll an already-created deployment to a terminal state.
    pub async fn watch(
        &self,
        group_id: &GroupId,
        deployment: Deployment<Requested>,
        plan: &WaitPlan,
    ) -> DeployResult<Deployment<Succeeded>> {
        let deployment_id = deployment.id().clone();

        // First observation decides whether the rollout ever started.
        let report = self.api.deployment_status(group_id, &deployment_id).await?;
        debug!(deployment_id = %deployment_id, status = ?report.status, "deployment status");

        match report.status {
            DeploymentStatus::Success => {
                info!(deployment_id = %deployment_id, "deployment succeeded");
                return Ok(deployment.succeed());
            }
            DeploymentStatus::Failed => {
                let reason = report
                    .error_message
                    .unwrap_or_else(|| "no reason reported".to_owned());
                error!(deployment_id = %deployment_id, reason = %reason, "deployment failed");
                return Err(DeployError::Failed {
                    deployment_id: deployment_id.to_string(),
                    reason,
                });
            }
            _ => {}
        }

        let in_progress = deployment.start();

        loop {
            match plan.pause().await {
                WaitOutcome::Waited => {}
                WaitOutcome::DeadlineExceeded => {
                    error!(deployment_id = %deployment_id, "deployment polling deadline exceeded");
                    return Err(DeployError::Timeout(deployment_id.to_string()));
                }
                WaitOutcome::Cancelled => {
                    return Err(DeployError::Cancelled(deployment_id.to_string()));
                }
            }

            let report = self.api.deployment_status(group_id, &deployment_id).await?;
            debug!(deployment_id = %deployment_id, status = ?report.status, "deployment status");

            match report.status {
                DeploymentStatus::Success => {
                    info!(deployment_id = %deployment_id, "deployment succeeded");
                    return Ok(in_progress.succeed());
                }
                DeploymentStatus::Failed => {
                    let reason = report
                        .error_message
                        .unwrap_or_else(|| "no reason reported".to_owned());
                    error!(deployment_id = %deployment_id, reason = %reason, "deployment failed");
                    let failed = in_progress.fail(reason);
                    return Err(DeployError::Failed {
                        deployment_id: deployment_id.to_string(),
                        reason: failed.reason().to_owned(),
                    });
                }
                DeploymentStatus::Requested
                | DeploymentStatus::InProgress
                | DeploymentStatus::Unknown => {}
            }
        }
    }
}

impl std::fmt::Debug for DeploymentMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeploymentMonitor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ScriptedDeployApi;
    use std::time::Duration;

    fn fast_plan() -> WaitPlan {
        WaitPlan::new(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn success_after_two_in_progress_polls_exactly_three_times() {
        let api = Arc::new(ScriptedDeployApi::new([
            DeploymentStatus::InProgress,
            DeploymentStatus::InProgress,
            DeploymentStatus::Success,
        ]));
        let monitor = DeploymentMonitor::new(api.clone());

        let group_id = GroupId::new("group-0001");
        let result = monitor.run(&group_id, "gv-0001", &fast_plan()).await;

        assert!(result.is_ok());
        // Three observations; the loop paused exactly twice, once before
        // each re-poll after a non-terminal status.
        assert_eq!(api.status_calls(), 3);
    }

    #[tokio::test]
    async fn failure_stops_polling_immediately() {
        let api = Arc::new(ScriptedDeployApi::new([
            DeploymentStatus::InProgress,
            DeploymentStatus::Failed,
        ]));
        let monitor = DeploymentMonitor::new(api.clone());

        let group_id = GroupId::new("group-0001");
        let err = monitor
            .run(&group_id, "gv-0001", &fast_plan())
            .await
            .unwrap_err();

        match err {
            DeployError::Failed { reason, .. } => assert_eq!(reason, "scripted failure"),
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(api.status_calls(), 2);
    }

    #[tokio::test]
    async fn immediate_success_needs_no_wait() {
        let api = Arc::new(ScriptedDeployApi::new([DeploymentStatus::Success]));
        let monitor = DeploymentMonitor::new(api.clone());

        let group_id = GroupId::new("group-0001");
        monitor.run(&group_id, "gv-0001", &fast_plan()).await.unwrap();
        assert_eq!(api.status_calls(), 1);
    }

    #[tokio::test]
    async fn stuck_deployment_hits_the_deadline() {
        let api = Arc::new(ScriptedDeployApi::new([DeploymentStatus::InProgress]));
        let monitor = DeploymentMonitor::new(api);

        let plan = WaitPlan::new(Duration::from_millis(5)).with_deadline(Duration::from_millis(20));
        let group_id = GroupId::new("group-0001");

        let err = monitor.run(&group_id, "gv-0001", &plan).await.unwrap_err();
        assert!(matches!(err, DeployError::Timeout(_)));
    }

    #[tokio::test]
    async fn cancellation_surfaces_as_cancelled() {
        use tokio_util::sync::CancellationToken;

        let api = Arc::new(ScriptedDeployApi::new([DeploymentStatus::InProgress]));
        let monitor = DeploymentMonitor::new(api);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let plan = WaitPlan::new(Duration::from_secs(60)).with_cancel(cancel);

        let group_id = GroupId::new("group-0001");
        let err = monitor.run(&group_id, "gv-0001", &plan).await.unwrap_err();
        assert!(matches!(err, DeployError::Cancelled(_)));
    }
}
