//! Implementation of the `outpost define` command.

use std::path::Path;

use anyhow::Context;
use clap::Args;

use outpost_core::{Accelerator, Arn, CloudConfig};
use outpost_fleet::definitions::{
    model_resource, validate_service_names, ConnectorBuilder, FunctionBuilder,
};
use outpost_fleet::{FleetApi, HttpFleetApi};

/// Arguments for the define command.
#[derive(Debug, Args)]
pub struct DefineArgs {
    /// Resource name for the model mount
    #[arg(long, default_value = "my-ml-resource")]
    pub resource_name: String,

    /// On-device mount path for the compiled model
    #[arg(long, default_value = "/ml_model")]
    pub mount_path: String,

    /// Inference function name
    #[arg(long, default_value = "ObjectDetection")]
    pub function_name: String,

    /// ARN of the function executable (alias) to run
    #[arg(long)]
    pub function_arn: String,

    /// Connector instance name
    #[arg(long, default_value = "ObjectDetectionConnectorTX2")]
    pub connector_name: String,

    /// ARN of the connector type for the target hardware
    #[arg(long)]
    pub connector_arn: String,

    /// Local inference service name shared by function and connector
    #[arg(long, default_value = "object-detection")]
    pub service_name: String,

    /// Local inference service timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub service_timeout_secs: u32,

    /// Local inference service memory limit in KB
    #[arg(long, default_value_t = 500_000)]
    pub service_memory_kb: u32,

    /// Use GPU acceleration
    #[arg(long)]
    pub gpu: bool,
}

pub async fn run(
    config: &CloudConfig,
    manifest_path: &Path,
    args: DefineArgs,
) -> Result<(), anyhow::Error> {
    let mut manifest = super::load_or_default(manifest_path).await;

    let compiled_uri = manifest
        .compiled_artifact_uri
        .clone()
        .context("manifest has no compiled_artifact_uri; run 'outpost compile' first")?;

    let resource = model_resource(&args.resource_name, &args.mount_path, compiled_uri);

    let function = FunctionBuilder::new(&args.function_name, Arn::new(&args.function_arn))
        .read_access(&args.resource_name)
        .service_name(&args.service_name)
        .build();

    let accelerator = if args.gpu {
        Accelerator::Gpu
    } else {
        Accelerator::Cpu
    };
    let connector = ConnectorBuilder::new(&args.connector_name, Arn::new(&args.connector_arn))
        .model(&args.resource_name, &args.mount_path)
        .service_name(&args.service_name)
        .service_timeout_secs(args.service_timeout_secs)
        .service_memory_kb(args.service_memory_kb)
        .accelerator(accelerator)
        .build();

    // A mismatch here deploys cleanly and fails on-device, so it is
    // rejected before anything is created.
    validate_service_names(&function, &connector).context("service name check")?;

    let api = HttpFleetApi::new(config).context("fleet client setup")?;

    let resource_version = api
        .create_resource_definition(&resource)
        .await
        .context("resource definition")?;
    println!("Resource definition: {}", resource_version.version_arn);

    let function_version = api
        .create_function_definition(&function)
        .await
        .context("function definition")?;
    println!("Function definition: {}", function_version.version_arn);

    let connector_version = api
        .create_connector_definition(&connector)
        .await
        .context("connector definition")?;
    println!("Connector definition: {}", connector_version.version_arn);

    manifest.resource_definition_version_arn = Some(resource_version.version_arn);
    manifest.function_definition_version_arn = Some(function_version.version_arn);
    manifest.connector_definition_version_arn = Some(connector_version.version_arn);
    manifest.save(manifest_path).await?;
    println!("Manifest updated: {}", manifest_path.display());

    Ok(())
}
