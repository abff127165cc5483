//! Pretrained model download.

use std::path::Path;

use tracing::info;

use crate::error::{ArtifactError, ArtifactResult};

/// Download a pretrained model file over HTTP to `dest`.
///
/// Returns the number of bytes written. Parent directories are created
/// as needed; an existing file at `dest` is overwritten (model zoos
/// publish immutable artifacts under versioned URLs).
pub async fn fetch_model(client: &reqwest::Client, url: &str, dest: &Path) -> ArtifactResult<u64> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ArtifactError::Fetch {
            url: url.to_owned(),
            message: e.to_string(),
        })?;

    if !response.status().is_success() {
        return Err(ArtifactError::Fetch {
            url: url.to_owned(),
            message: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(|e| ArtifactError::Fetch {
        url: url.to_owned(),
        message: e.to_string(),
    })?;

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(dest, &bytes).await?;

    info!(url = %url, size = bytes.len(), dest = %dest.display(), "model downloaded");

    Ok(bytes.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_from_unreachable_host_is_typed() {
        let client = reqwest::Client::new();
        let dir = tempfile::TempDir::new().unwrap();

        let err = fetch_model(
            &client,
            "http://127.0.0.1:1/model.params",
            &dir.path().join("model.params"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ArtifactError::Fetch { .. }));
    }
}
