//! Implementation of the `outpost provision` command.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use outpost_core::CloudConfig;
use outpost_fleet::{identity, GroupProvisioner, HttpFleetApi, ProvisionRequest};

pub async fn run(
    config: &CloudConfig,
    manifest_path: &Path,
    group: &str,
    identity_dir: &Path,
) -> Result<(), anyhow::Error> {
    println!("Provisioning group '{group}'");

    let api = Arc::new(HttpFleetApi::new(config).context("fleet client setup")?);
    let provisioner = GroupProvisioner::new(api);

    let request = ProvisionRequest::named(group);
    let provisioned = provisioner
        .provision(&request)
        .await
        .context("provisioning chain")?;

    println!("  Group:       {}", provisioned.group.id);
    println!("  Core thing:  {}", provisioned.thing.name);
    println!("  Certificate: {}", provisioned.certificate.certificate_id);
    println!("  Policy:      {}", provisioned.policy.name);

    let prefix = provisioned.thing.name.as_str().to_owned();
    let paths = identity::persist_identity(
        identity_dir,
        &prefix,
        &provisioned.certificate,
        &provisioned.thing.arn,
        config,
    )
    .await
    .context("persisting identity files")?;

    println!("  Identity written to {}", identity_dir.display());

    let mut manifest = super::load_or_default(manifest_path).await;
    manifest.group_id = Some(provisioned.group.id.clone());
    manifest.group_arn = Some(provisioned.group.arn.clone());
    manifest.core_thing_name = Some(provisioned.thing.name.clone());
    manifest.core_thing_arn = Some(provisioned.thing.arn.clone());
    manifest.certificate_id = Some(provisioned.certificate.certificate_id.clone());
    manifest.certificate_arn = Some(provisioned.certificate.certificate_arn.clone());
    manifest.policy_name = Some(provisioned.policy.name.clone());
    manifest.core_definition_version_arn = Some(provisioned.core_definition.version_arn.clone());
    manifest.identity_paths = Some(paths);
    manifest.save(manifest_path).await?;
    println!("Manifest updated: {}", manifest_path.display());

    Ok(())
}
