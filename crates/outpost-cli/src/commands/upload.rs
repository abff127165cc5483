//! Implementation of the `outpost upload` command.

use std::path::Path;

use anyhow::Context;

use outpost_artifact::{ArtifactStore, StorageBackend};
use outpost_core::CloudConfig;

pub async fn run(
    config: &CloudConfig,
    manifest_path: &Path,
    archive: &Path,
) -> Result<(), anyhow::Error> {
    let archive_name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .context("archive path has no file name")?;

    let store = ArtifactStore::new(config, StorageBackend::S3).context("object store setup")?;
    let key = ArtifactStore::model_key(archive_name);

    println!("Uploading {} to s3://{}/{}", archive.display(), store.bucket(), key);

    let uri = store.upload(archive, &key).await.context("upload failed")?;
    println!("Uploaded: {uri}");

    let mut manifest = super::load_or_default(manifest_path).await;
    manifest.model_archive_uri = Some(uri.as_str().to_owned());
    manifest.save(manifest_path).await?;
    println!("Manifest updated: {}", manifest_path.display());

    Ok(())
}
