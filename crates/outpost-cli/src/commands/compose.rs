//! Implementation of the `outpost compose` command.

use std::path::Path;

use anyhow::Context;

use outpost_core::CloudConfig;
use outpost_fleet::{compose_group_version, HttpFleetApi, ProvisionManifest};

pub async fn run(config: &CloudConfig, manifest_path: &Path) -> Result<(), anyhow::Error> {
    let mut manifest = ProvisionManifest::load(manifest_path)
        .await
        .context("loading manifest")?;

    let group_id = manifest.require_group_id().context("group")?.clone();
    let refs = manifest.require_version_refs().context("definitions")?;

    println!("Composing group version for {group_id}");

    let api = HttpFleetApi::new(config).context("fleet client setup")?;
    let version = compose_group_version(&api, &group_id, &refs)
        .await
        .context("group version")?;

    println!("Group version: {} ({})", version.id, version.arn);

    manifest.group_version_id = Some(version.id);
    manifest.group_version_arn = Some(version.arn);
    manifest.save(manifest_path).await?;
    println!("Manifest updated: {}", manifest_path.display());

    Ok(())
}
