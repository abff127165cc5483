//! Implementation of the `outpost compile` command.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;

use outpost_artifact::{CompileClient, CompileRequest, ObjectUri};
use outpost_core::{CloudConfig, TargetDevice, WaitPlan};

pub struct CompileArgs {
    pub framework: String,
    pub shapes: Vec<String>,
    pub target: TargetDevice,
    pub build_target: TargetDevice,
}

pub async fn run(
    config: &CloudConfig,
    manifest_path: &Path,
    args: CompileArgs,
) -> Result<(), anyhow::Error> {
    let mut manifest = super::load_or_default(manifest_path).await;

    let model_uri = manifest
        .model_archive_uri
        .clone()
        .context("manifest has no model_archive_uri; run 'outpost upload' first")?;

    let input_shapes = parse_shapes(&args.shapes)?;

    let request = CompileRequest {
        model_uri: ObjectUri::from_raw(model_uri),
        framework: args.framework,
        input_shapes,
        target_device: args.target,
        build_target: args.build_target,
        output_prefix: format!("s3://{}/compiled/", config.bucket),
    };

    println!(
        "Submitting compile job for {} (target {})",
        request.model_uri, request.target_device
    );

    let client = CompileClient::new(config).context("compile client setup")?;
    let job_id = client.submit(&request).await.context("compile submit")?;
    println!("Job ID: {job_id}");

    println!("Waiting for compilation...");
    let plan = WaitPlan::from_config(&config.poll);
    let artifact = client
        .wait_complete(&job_id, &plan)
        .await
        .context("compile job")?;

    println!("Compiled artifact: {}", artifact.artifact_uri);

    manifest.compiled_artifact_uri = Some(artifact.artifact_uri.as_str().to_owned());
    manifest.save(manifest_path).await?;
    println!("Manifest updated: {}", manifest_path.display());

    Ok(())
}

/// Parse `name=d1,d2,...` into a named shape entry.
fn parse_shapes(specs: &[String]) -> Result<BTreeMap<String, Vec<i64>>, anyhow::Error> {
    let mut shapes = BTreeMap::new();

    for spec in specs {
        let (name, dims) = spec
            .split_once('=')
            .with_context(|| format!("invalid shape '{spec}'; expected name=d1,d2,..."))?;

        let dims = dims
            .split(',')
            .map(|d| d.trim().parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("invalid dimensions in shape '{spec}'"))?;

        shapes.insert(name.to_owned(), dims);
    }

    Ok(shapes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_shape() {
        let shapes = parse_shapes(&["data=1,3,224,224".to_owned()]).unwrap();
        assert_eq!(shapes["data"], vec![1, 3, 224, 224]);
    }

    #[test]
    fn parse_rejects_missing_equals() {
        assert!(parse_shapes(&["data:1,3".to_owned()]).is_err());
    }

    #[test]
    fn parse_rejects_bad_dimension() {
        assert!(parse_shapes(&["data=1,x".to_owned()]).is_err());
    }
}
