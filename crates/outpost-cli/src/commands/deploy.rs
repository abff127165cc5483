//! Implementation of the `outpost deploy` command.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use outpost_core::{CloudConfig, WaitPlan};
use outpost_deploy::{DeploymentMonitor, HttpDeploymentApi};
use outpost_fleet::ProvisionManifest;

pub async fn run(config: &CloudConfig, manifest_path: &Path) -> Result<(), anyhow::Error> {
    let mut manifest = ProvisionManifest::load(manifest_path)
        .await
        .context("loading manifest")?;

    let group_id = manifest.require_group_id().context("group")?.clone();
    let group_version_id = manifest
        .group_version_id
        .clone()
        .context("manifest has no group_version_id; run 'outpost compose' first")?;

    println!("Deploying group version {group_version_id} to {group_id}");

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let api = Arc::new(HttpDeploymentApi::new(config).context("deployment client setup")?);
    let monitor = DeploymentMonitor::new(api);

    let plan = WaitPlan::from_config(&config.poll).with_cancel(cancel);

    println!(
        "Polling every {}s (deadline {}s)...",
        config.poll.interval_secs, config.poll.deadline_secs
    );

    let succeeded = monitor
        .run(&group_id, &group_version_id, &plan)
        .await
        .context("deployment")?;

    println!("Deployment {} succeeded", succeeded.id());

    manifest.deployment_id = Some(succeeded.id().clone());
    manifest.save(manifest_path).await?;
    println!("Manifest updated: {}", manifest_path.display());

    Ok(())
}
