//! Outpost CLI - provision edge-device fleets for ML inference.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use outpost_core::TargetDevice;

#[derive(Parser)]
#[command(name = "outpost")]
#[command(about = "Provision edge-device fleets for ML inference deployments")]
#[command(version)]
struct Cli {
    /// Path to the provisioning manifest shared between commands
    #[arg(long, global = true, default_value = "outpost-manifest.json")]
    manifest: PathBuf,

    /// Path to the configuration file (defaults to outpost.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a pretrained model file
    Fetch {
        /// Source URL
        url: String,

        /// Destination path
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Compress model files into a .tar.gz archive
    Package {
        /// Model files to include (weights, definition)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Archive path to write
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Upload the model archive to object storage
    Upload {
        /// Archive to upload
        archive: PathBuf,
    },

    /// Submit a compile job and wait for the device artifact
    Compile {
        /// Framework the model was exported from
        #[arg(long, default_value = "mxnet")]
        framework: String,

        /// Input shape, e.g. data=1,3,224,224 (repeatable)
        #[arg(long = "shape", required = true)]
        shapes: Vec<String>,

        /// Device family the model will run on
        #[arg(long)]
        target: TargetDevice,

        /// Compute environment the compiler runs in (not the runtime device)
        #[arg(long, default_value = "ml_c5")]
        build_target: TargetDevice,
    },

    /// Create the group, core identity, and policy
    Provision {
        /// Group name
        group: String,

        /// Directory for certificate, keys, and bootstrap config
        #[arg(long, default_value = "identity")]
        identity_dir: PathBuf,
    },

    /// Create resource, function, and connector definitions
    Define(commands::define::DefineArgs),

    /// Compose a group version from the recorded definitions
    Compose,

    /// Create a deployment and poll it to a terminal state
    Deploy,

    /// Query deployment status once
    Status,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => outpost_core::CloudConfig::from_file(path),
        None => outpost_core::CloudConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let result: Result<(), anyhow::Error> = match cli.command {
        Commands::Fetch { url, out } => commands::fetch::run(&url, &out).await,
        Commands::Package { files, out } => commands::package::run(&files, &out).await,
        Commands::Upload { archive } => {
            commands::upload::run(&config, &cli.manifest, &archive).await
        }
        Commands::Compile {
            framework,
            shapes,
            target,
            build_target,
        } => {
            commands::compile::run(
                &config,
                &cli.manifest,
                commands::compile::CompileArgs {
                    framework,
                    shapes,
                    target,
                    build_target,
                },
            )
            .await
        }
        Commands::Provision {
            group,
            identity_dir,
        } => commands::provision::run(&config, &cli.manifest, &group, &identity_dir).await,
        Commands::Define(args) => commands::define::run(&config, &cli.manifest, args).await,
        Commands::Compose => commands::compose::run(&config, &cli.manifest).await,
        Commands::Deploy => commands::deploy::run(&config, &cli.manifest).await,
        Commands::Status => commands::status::run(&config, &cli.manifest).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
