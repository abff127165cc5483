//! Tar and gzip packaging for model archives.
//!
//! The compile service consumes models as a single `.tar.gz` containing
//! the weight and definition files at the archive root.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tokio::task::spawn_blocking;
use tracing::debug;

use crate::error::{ArtifactError, ArtifactResult};

/// Pack model files into a `.tar.gz` archive at `archive_path`.
///
/// Files land at the archive root under their file names, which is the
/// layout the compile service expects. Every source file must exist;
/// a missing file surfaces as [`ArtifactError::SourceMissing`] before
/// anything is written.
pub async fn pack_model(files: &[PathBuf], archive_path: &Path) -> ArtifactResult<u64> {
    for file in files {
        if !file.is_file() {
            return Err(ArtifactError::SourceMissing(file.clone()));
        }
    }

    let files = files.to_vec();
    let archive_path = archive_path.to_owned();
    spawn_blocking(move || pack_model_sync(&files, &archive_path))
        .await
        .map_err(|e| ArtifactError::Archive(e.to_string()))?
}

fn pack_model_sync(files: &[PathBuf], archive_path: &Path) -> ArtifactResult<u64> {
    if let Some(parent) = archive_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut tar_data = Vec::new();
    {
        let mut tar_builder = tar::Builder::new(&mut tar_data);
        tar_builder.follow_symlinks(false);

        for file in files {
            let name = file
                .file_name()
                .ok_or_else(|| ArtifactError::Archive(format!("not a file: {}", file.display())))?;
            tar_builder
                .append_path_with_name(file, name)
                .map_err(|e| ArtifactError::Archive(e.to_string()))?;
        }

        tar_builder
            .finish()
            .map_err(|e| ArtifactError::Archive(e.to_string()))?;
    }

    debug!(uncompressed_size = tar_data.len(), "created tar archive");

    let out = std::fs::File::create(archive_path)?;
    let mut encoder = GzEncoder::new(out, Compression::default());
    std::io::copy(&mut Cursor::new(&tar_data), &mut encoder)?;
    let out = encoder.finish()?;
    let size = out.metadata()?.len();

    debug!(
        path = %archive_path.display(),
        compressed_size = size,
        "wrote gzip archive"
    );

    Ok(size)
}

/// Unpack a `.tar.gz` archive into `dest`, creating it if needed.
pub async fn unpack(data: &Bytes, dest: &Path) -> ArtifactResult<()> {
    let data = data.clone();
    let dest = dest.to_owned();
    spawn_blocking(move || unpack_sync(&data, &dest))
        .await
        .map_err(|e| ArtifactError::Archive(e.to_string()))?
}

fn unpack_sync(data: &[u8], dest: &Path) -> ArtifactResult<()> {
    std::fs::create_dir_all(dest)?;

    let decoder = GzDecoder::new(Cursor::new(data));
    let mut archive = tar::Archive::new(decoder);
    archive.set_preserve_permissions(true);
    archive
        .unpack(dest)
        .map_err(|e| ArtifactError::Archive(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn pack_and_unpack_model_files() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        let json = src.path().join("model.json");
        let params = src.path().join("model.params");
        std::fs::write(&json, r#"{"nodes": []}"#).unwrap();
        std::fs::write(&params, vec![0u8; 256]).unwrap();

        let archive = src.path().join("mobilenet.tar.gz");
        let size = pack_model(&[json, params], &archive).await.unwrap();
        assert!(size > 0);

        let data = Bytes::from(std::fs::read(&archive).unwrap());
        unpack(&data, dest.path()).await.unwrap();

        let restored = std::fs::read_to_string(dest.path().join("model.json")).unwrap();
        assert_eq!(restored, r#"{"nodes": []}"#);
        assert_eq!(
            std::fs::read(dest.path().join("model.params")).unwrap().len(),
            256
        );
    }

    #[tokio::test]
    async fn missing_source_file_is_typed() {
        let src = TempDir::new().unwrap();
        let archive = src.path().join("model.tar.gz");

        let missing = src.path().join("model.json");
        let err = pack_model(&[missing.clone()], &archive).await.unwrap_err();

        match err {
            ArtifactError::SourceMissing(path) => assert_eq!(path, missing),
            other => panic!("expected SourceMissing, got {other:?}"),
        }
        assert!(!archive.exists());
    }
}
