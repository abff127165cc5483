//! The provisioning manifest.
//!
//! A JSON dump of every identifier the workflow creates, written to disk
//! after each stage. The manifest is the only state shared between CLI
//! invocations: each stage reads the identifiers the previous stage
//! recorded, keeping control flow strictly forward.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use outpost_core::{Arn, DeploymentId, GroupId, ThingName};

use crate::error::{FleetError, FleetResult};
use crate::identity::IdentityPaths;
use crate::types::GroupVersionRefs;

/// All identifiers created by the workflow so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvisionManifest {
    /// Object URI of the uploaded model archive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_archive_uri: Option<String>,

    /// Object URI of the compiled model artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiled_artifact_uri: Option<String>,

    /// Created group ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,

    /// Created group ARN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_arn: Option<Arn>,

    /// Core thing name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_thing_name: Option<ThingName>,

    /// Core thing ARN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_thing_arn: Option<Arn>,

    /// Certificate ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_id: Option<String>,

    /// Certificate ARN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_arn: Option<Arn>,

    /// Paths of the persisted identity files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_paths: Option<IdentityPaths>,

    /// Attached policy name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_name: Option<String>,

    /// Core definition version ARN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_definition_version_arn: Option<Arn>,

    /// Resource definition version ARN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_definition_version_arn: Option<Arn>,

    /// Function definition version ARN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_definition_version_arn: Option<Arn>,

    /// Connector definition version ARN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_definition_version_arn: Option<Arn>,

    /// Composed group version ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_version_id: Option<String>,

    /// Composed group version ARN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_version_arn: Option<Arn>,

    /// Created deployment ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<DeploymentId>,
}

impl ProvisionManifest {
    /// Default manifest file name.
    pub const FILE_NAME: &'static str = "outpost-manifest.json";

    /// Load a manifest from disk.
    pub async fn load(path: &Path) -> FleetResult<Self> {
        if !path.is_file() {
            return Err(FleetError::ManifestNotFound(path.to_owned()));
        }

        let data = tokio::fs::read(path).await?;
        let manifest = serde_json::from_slice(&data)?;
        debug!(path = %path.display(), "manifest loaded");
        Ok(manifest)
    }

    /// Write the manifest to disk as pretty JSON.
    pub async fn save(&self, path: &Path) -> FleetResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let body = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, body).await?;
        debug!(path = %path.display(), "manifest saved");
        Ok(())
    }

    /// Default manifest path under a working directory.
    #[must_use]
    pub fn default_path(dir: &Path) -> PathBuf {
        dir.join(Self::FILE_NAME)
    }

    /// The group ID, or a typed error naming the missing field.
    pub fn require_group_id(&self) -> FleetResult<&GroupId> {
        self.group_id
            .as_ref()
            .ok_or(FleetError::ManifestIncomplete("group_id"))
    }

    /// The compiled artifact URI, or a typed error.
    pub fn require_compiled_artifact(&self) -> FleetResult<&str> {
        self.compiled_artifact_uri
            .as_deref()
            .ok_or(FleetError::ManifestIncomplete("compiled_artifact_uri"))
    }

    /// The deployment ID, or a typed error.
    pub fn require_deployment_id(&self) -> FleetResult<&DeploymentId> {
        self.deployment_id
            .as_ref()
            .ok_or(FleetError::ManifestIncomplete("deployment_id"))
    }

    /// The full set of definition version refs, or a typed error naming
    /// the first missing definition.
    pub fn require_version_refs(&self) -> FleetResult<GroupVersionRefs> {
        Ok(GroupVersionRefs {
            core_definition_version_arn: self
                .core_definition_version_arn
                .clone()
                .ok_or(FleetError::ManifestIncomplete("core_definition_version_arn"))?,
            resource_definition_version_arn: self.resource_definition_version_arn.clone().ok_or(
                FleetError::ManifestIncomplete("resource_definition_version_arn"),
            )?,
            function_definition_version_arn: self.function_definition_version_arn.clone().ok_or(
                FleetError::ManifestIncomplete("function_definition_version_arn"),
            )?,
            connector_definition_version_arn: self.connector_definition_version_arn.clone().ok_or(
                FleetError::ManifestIncomplete("connector_definition_version_arn"),
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn round_trip_reproduces_exact_identifiers() {
        let dir = TempDir::new().unwrap();
        let path = ProvisionManifest::default_path(dir.path());

        let manifest = ProvisionManifest {
            group_id: Some(GroupId::new("group-0001")),
            core_definition_version_arn: Some(Arn::new(
                "arn:aws:greengrass:mock:cores/core-0002/versions/1",
            )),
            certificate_arn: Some(Arn::new("arn:aws:iot:mock:cert/cert-0003")),
            ..ProvisionManifest::default()
        };
        manifest.save(&path).await.unwrap();

        let loaded = ProvisionManifest::load(&path).await.unwrap();
        assert_eq!(loaded.group_id, manifest.group_id);
        assert_eq!(
            loaded.core_definition_version_arn,
            manifest.core_definition_version_arn
        );
        assert_eq!(loaded.certificate_arn, manifest.certificate_arn);
    }

    #[tokio::test]
    async fn missing_manifest_is_typed() {
        let dir = TempDir::new().unwrap();
        let err = ProvisionManifest::load(&dir.path().join("missing.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, FleetError::ManifestNotFound(_)));
    }

    #[test]
    fn incomplete_manifest_names_the_missing_field() {
        let manifest = ProvisionManifest {
            core_definition_version_arn: Some(Arn::new("arn:core")),
            resource_definition_version_arn: Some(Arn::new("arn:resource")),
            ..ProvisionManifest::default()
        };

        let err = manifest.require_version_refs().unwrap_err();
        match err {
            FleetError::ManifestIncomplete(field) => {
                assert_eq!(field, "function_definition_version_arn");
            }
            other => panic!("expected ManifestIncomplete, got {other:?}"),
        }
    }
}
