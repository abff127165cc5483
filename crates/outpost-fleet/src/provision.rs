//! The core provisioning chain.
//!
//! Creates, in strict order: group, certificate and keys, core thing,
//! principal attachment, policy, policy attachment, core definition.
//! Each step's output feeds the next. There is no rollback: a failure at
//! step N leaves steps 1..N's cloud resources in place, and the returned
//! error names the step that stopped the chain.

use std::sync::Arc;

use tracing::info;

use outpost_core::ThingName;

use crate::api::FleetApi;
use crate::error::{FleetError, FleetResult};
use crate::types::{
    CertificateBundle, CoreDefinitionSpec, DefinitionVersion, GroupRecord, PolicyDocument,
    PolicyRecord, ThingRecord,
};

/// Inputs to the provisioning chain.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    /// Name for the device group.
    pub group_name: String,
    /// Name for the core thing.
    pub core_thing_name: ThingName,
    /// Name for the security policy.
    pub policy_name: String,
    /// Policy document to attach; defaults to the device-minimal set.
    pub policy: PolicyDocument,
    /// Whether the core's shadow syncs to the cloud.
    pub sync_shadow: bool,
}

impl ProvisionRequest {
    /// A request with conventional names derived from the group name.
    #[must_use]
    pub fn named(group_name: impl Into<String>) -> Self {
        let group_name = group_name.into();
        Self {
            core_thing_name: ThingName::new(format!("{group_name}-core")),
            policy_name: format!("{group_name}-core-policy"),
            policy: PolicyDocument::device_minimal(),
            sync_shadow: true,
            group_name,
        }
    }
}

/// Everything the chain created, with the identifiers later stages need.
#[derive(Debug, Clone)]
pub struct ProvisionedCore {
    /// The created group.
    pub group: GroupRecord,
    /// The core thing.
    pub thing: ThingRecord,
    /// Certificate and key material. The private key must be persisted
    /// before this value is dropped; there is no regeneration path.
    pub certificate: CertificateBundle,
    /// The attached policy.
    pub policy: PolicyRecord,
    /// The core definition and its version ARN.
    pub core_definition: DefinitionVersion,
}

/// Runs the provisioning chain against a fleet API.
pub struct GroupProvisioner {
    api: Arc<dyn FleetApi>,
}

impl GroupProvisioner {
    /// Create a provisioner.
    #[must_use]
    pub fn new(api: Arc<dyn FleetApi>) -> Self {
        Self { api }
    }

    /// Run the full chain.
    pub async fn provision(&self, request: &ProvisionRequest) -> FleetResult<ProvisionedCore> {
        info!(group = %request.group_name, "provisioning fleet group");

        let group = self
            .api
            .create_group(&request.group_name)
            .await
            .map_err(FleetError::at_step("create_group"))?;
        info!(group_id = %group.id, "group created");

        let certificate = self
            .api
            .create_keys_and_certificate()
            .await
            .map_err(FleetError::at_step("create_keys_and_certificate"))?;
        info!(certificate_id = %certificate.certificate_id, "certificate created");

        let thing = self
            .api
            .create_core_thing(&request.core_thing_name)
            .await
            .map_err(FleetError::at_step("create_core_thing"))?;
        info!(thing = %thing.name, "core thing created");

        self.api
            .attach_thing_principal(&thing.name, &certificate.certificate_arn)
            .await
            .map_err(FleetError::at_step("attach_thing_principal"))?;

        let policy = self
            .api
            .create_policy(&request.policy_name, &request.policy)
            .await
            .map_err(FleetError::at_step("create_policy"))?;

        self.api
            .attach_policy(&policy.name, &certificate.certificate_arn)
            .await
            .map_err(FleetError::at_step("attach_policy"))?;
        info!(policy = %policy.name, "policy attached to certificate");

        let spec = CoreDefinitionSpec {
            thing_arn: thing.arn.clone(),
            certificate_arn: certificate.certificate_arn.clone(),
            sync_shadow: request.sync_shadow,
        };
        let core_definition = self
            .api
            .create_core_definition(&group.id, &spec)
            .await
            .map_err(FleetError::at_step("create_core_definition"))?;
        info!(
            group_id = %group.id,
            core_version = %core_definition.version_arn,
            "core definition created"
        );

        Ok(ProvisionedCore {
            group,
            thing,
            certificate,
            policy,
            core_definition,
        })
    }
}

impl std::fmt::Debug for GroupProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupProvisioner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockFleetApi;

    #[tokio::test]
    async fn chain_runs_in_strict_order() {
        let api = Arc::new(MockFleetApi::new());
        let provisioner = GroupProvisioner::new(api.clone());

        let request = ProvisionRequest::named("camera-fleet");
        let provisioned = provisioner.provision(&request).await.unwrap();

        assert_eq!(provisioned.group.name, "camera-fleet");
        assert_eq!(provisioned.thing.name.as_str(), "camera-fleet-core");
        assert_eq!(provisioned.policy.name, "camera-fleet-core-policy");
        assert!(!provisioned.certificate.key_pair.private_key.is_empty());

        assert_eq!(
            api.call_order(),
            vec![
                "create_group",
                "create_keys_and_certificate",
                "create_core_thing",
                "attach_thing_principal",
                "create_policy",
                "attach_policy",
                "create_core_definition",
            ]
        );
    }

    #[tokio::test]
    async fn second_provision_into_same_group_name_creates_new_group() {
        let api = Arc::new(MockFleetApi::new());
        let provisioner = GroupProvisioner::new(api);

        let request = ProvisionRequest::named("camera-fleet");
        let first = provisioner.provision(&request).await.unwrap();
        let second = provisioner.provision(&request).await.unwrap();

        // The service does not dedupe by name; each run is a fresh chain.
        assert_ne!(first.group.id, second.group.id);
    }
}
