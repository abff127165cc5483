//! Implementation of the `outpost package` command.

use std::path::{Path, PathBuf};

use anyhow::Context;

pub async fn run(files: &[PathBuf], out: &Path) -> Result<(), anyhow::Error> {
    println!("Packaging {} file(s) into {}", files.len(), out.display());

    let size = outpost_artifact::pack_model(files, out)
        .await
        .context("archive creation failed")?;

    println!("Wrote {} ({} bytes)", out.display(), size);
    Ok(())
}
