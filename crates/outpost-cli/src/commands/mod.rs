//! Command implementations for the outpost CLI.
//!
//! Each command is one discrete step of the provisioning workflow. The
//! manifest file threads identifiers from step to step; a command refuses
//! to run when the manifest lacks what its stage needs.

pub mod compile;
pub mod compose;
pub mod define;
pub mod deploy;
pub mod fetch;
pub mod package;
pub mod provision;
pub mod status;
pub mod upload;

use std::path::Path;

use outpost_fleet::ProvisionManifest;

/// Load the manifest, or start a fresh one if this is the first stage.
pub(crate) async fn load_or_default(path: &Path) -> ProvisionManifest {
    ProvisionManifest::load(path).await.unwrap_or_default()
}
