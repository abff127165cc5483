//! Implementation of the `outpost fetch` command.

use std::path::Path;

use anyhow::Context;

pub async fn run(url: &str, out: &Path) -> Result<(), anyhow::Error> {
    println!("Fetching model from {url}");

    let client = reqwest::Client::new();
    let size = outpost_artifact::fetch_model(&client, url, out)
        .await
        .context("model download failed")?;

    println!("Wrote {} ({} bytes)", out.display(), size);
    Ok(())
}
