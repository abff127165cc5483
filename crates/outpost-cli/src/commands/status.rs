//! Implementation of the `outpost status` command.

use std::path::Path;

use anyhow::Context;

use outpost_core::CloudConfig;
use outpost_deploy::{DeploymentApi, HttpDeploymentApi};
use outpost_fleet::ProvisionManifest;

pub async fn run(config: &CloudConfig, manifest_path: &Path) -> Result<(), anyhow::Error> {
    let manifest = ProvisionManifest::load(manifest_path)
        .await
        .context("loading manifest")?;

    let group_id = manifest.require_group_id().context("group")?;
    let deployment_id = manifest.require_deployment_id().context("deployment")?;

    let api = HttpDeploymentApi::new(config).context("deployment client setup")?;
    let report = api
        .deployment_status(group_id, deployment_id)
        .await
        .context("status query")?;

    println!("Deployment {deployment_id}: {:?}", report.status);
    if let Some(detail) = report.error_message {
        println!("  Detail: {detail}");
    }

    Ok(())
}
