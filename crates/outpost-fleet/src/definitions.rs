//! Builders for resource, function, and connector definitions.
//!
//! The builders encode the object-detection deployment defaults and keep
//! the naming-consistency invariant checkable in one place: the function's
//! local inference service name and the connector's
//! `LocalInferenceServiceName` parameter must match exactly, or the
//! deployment installs cleanly and then fails silently on-device.

use std::collections::BTreeMap;

use outpost_core::{Accelerator, Arn};

use crate::error::{FleetError, FleetResult};
use crate::types::{
    ConnectorDefinition, FunctionDefinition, IsolationMode, Permission, ResourceAccess,
    ResourceDefinition,
};

/// Declare a model mount: compiled artifact at `source_uri`, exposed to
/// on-device code at `mount_path`.
#[must_use]
pub fn model_resource(
    name: impl Into<String>,
    mount_path: impl Into<String>,
    source_uri: impl Into<String>,
) -> ResourceDefinition {
    ResourceDefinition {
        name: name.into(),
        mount_path: mount_path.into(),
        source_uri: source_uri.into(),
    }
}

/// Builder for [`FunctionDefinition`].
#[derive(Debug, Clone)]
pub struct FunctionBuilder {
    definition: FunctionDefinition,
}

impl FunctionBuilder {
    /// Start a function definition with the sandbox defaults used for
    /// inference functions: containerised, 96 MB ceiling, 10 s timeout,
    /// pinned.
    #[must_use]
    pub fn new(name: impl Into<String>, executable: Arn) -> Self {
        Self {
            definition: FunctionDefinition {
                name: name.into(),
                executable,
                isolation: IsolationMode::Container,
                memory_kb: 98304,
                timeout_secs: 10,
                pinned: true,
                resource_access: Vec::new(),
                local_inference_service_name: String::new(),
                environment: BTreeMap::new(),
            },
        }
    }

    /// Set the isolation mode.
    #[must_use]
    pub fn isolation(mut self, isolation: IsolationMode) -> Self {
        self.definition.isolation = isolation;
        self
    }

    /// Set the memory ceiling in KB.
    #[must_use]
    pub fn memory_kb(mut self, memory_kb: u32) -> Self {
        self.definition.memory_kb = memory_kb;
        self
    }

    /// Set the execution timeout in seconds.
    #[must_use]
    pub fn timeout_secs(mut self, timeout_secs: u32) -> Self {
        self.definition.timeout_secs = timeout_secs;
        self
    }

    /// Set whether the function is pinned (long-lived).
    #[must_use]
    pub fn pinned(mut self, pinned: bool) -> Self {
        self.definition.pinned = pinned;
        self
    }

    /// Grant read-only access to a resource.
    #[must_use]
    pub fn read_access(mut self, resource_name: impl Into<String>) -> Self {
        self.definition.resource_access.push(ResourceAccess {
            resource_name: resource_name.into(),
            permission: Permission::Ro,
        });
        self
    }

    /// Grant read-write access to a resource.
    #[must_use]
    pub fn write_access(mut self, resource_name: impl Into<String>) -> Self {
        self.definition.resource_access.push(ResourceAccess {
            resource_name: resource_name.into(),
            permission: Permission::Rw,
        });
        self
    }

    /// Declare the local inference service this function calls into.
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.definition.local_inference_service_name = name.into();
        self
    }

    /// Add an environment variable for the function process.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.definition.environment.insert(key.into(), value.into());
        self
    }

    /// Finish the definition.
    #[must_use]
    pub fn build(self) -> FunctionDefinition {
        self.definition
    }
}

/// Builder for [`ConnectorDefinition`].
#[derive(Debug, Clone)]
pub struct ConnectorBuilder {
    definition: ConnectorDefinition,
}

impl ConnectorBuilder {
    /// Start a connector definition for the given connector type.
    #[must_use]
    pub fn new(name: impl Into<String>, connector_arn: Arn) -> Self {
        Self {
            definition: ConnectorDefinition {
                name: name.into(),
                connector_arn,
                parameters: BTreeMap::new(),
            },
        }
    }

    /// Point the connector at the model resource and its mount path.
    #[must_use]
    pub fn model(mut self, resource_name: impl Into<String>, mount_path: impl Into<String>) -> Self {
        self.definition
            .parameters
            .insert("MLModelResourceId".to_owned(), resource_name.into());
        self.definition
            .parameters
            .insert("MLModelDestinationPath".to_owned(), mount_path.into());
        self
    }

    /// Declare the local inference service name the connector serves.
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.definition.parameters.insert(
            ConnectorDefinition::SERVICE_NAME_PARAM.to_owned(),
            name.into(),
        );
        self
    }

    /// Set the local service timeout in seconds.
    #[must_use]
    pub fn service_timeout_secs(mut self, secs: u32) -> Self {
        self.definition.parameters.insert(
            "LocalInferenceServiceTimeoutSeconds".to_owned(),
            secs.to_string(),
        );
        self
    }

    /// Set the local service memory limit in KB.
    #[must_use]
    pub fn service_memory_kb(mut self, kb: u32) -> Self {
        self.definition.parameters.insert(
            "LocalInferenceServiceMemoryLimitKB".to_owned(),
            kb.to_string(),
        );
        self
    }

    /// Select the hardware accelerator.
    #[must_use]
    pub fn accelerator(mut self, accelerator: Accelerator) -> Self {
        self.definition
            .parameters
            .insert("GPUAcceleration".to_owned(), accelerator.as_str().to_owned());
        self
    }

    /// Finish the definition.
    #[must_use]
    pub fn build(self) -> ConnectorDefinition {
        self.definition
    }
}

/// Check the naming-consistency invariant between a function and the
/// connector it pairs with.
///
/// The external API accepts a mismatched pair and the deployment installs
/// successfully, so this is validated locally before composing a group
/// version.
pub fn validate_service_names(
    function: &FunctionDefinition,
    connector: &ConnectorDefinition,
) -> FleetResult<()> {
    let connector_name = connector.local_inference_service_name().unwrap_or_default();

    if function.local_inference_service_name != connector_name {
        return Err(FleetError::ServiceNameMismatch {
            function: function.local_inference_service_name.clone(),
            connector: connector_name.to_owned(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_detection_pair(
        function_service: &str,
        connector_service: &str,
    ) -> (FunctionDefinition, ConnectorDefinition) {
        let function = FunctionBuilder::new(
            "ObjectDetection",
            Arn::new("arn:aws:lambda:us-west-2:1:function:ObjectDetection:prod"),
        )
        .read_access("my-ml-resource")
        .service_name(function_service)
        .build();

        let connector = ConnectorBuilder::new(
            "ObjectDetectionConnectorTX2",
            Arn::new("arn:aws:greengrass:::connectors/ObjectDetectionAarch64TX2/1"),
        )
        .model("my-ml-resource", "/ml_model")
        .service_name(connector_service)
        .service_timeout_secs(10)
        .service_memory_kb(500000)
        .accelerator(Accelerator::Gpu)
        .build();

        (function, connector)
    }

    #[test]
    fn matching_service_names_pass_validation() {
        let (function, connector) = object_detection_pair("object-detection", "object-detection");
        assert!(validate_service_names(&function, &connector).is_ok());
    }

    #[test]
    fn mismatched_service_names_are_flagged_before_deployment() {
        let (function, connector) = object_detection_pair("object-detection", "objectdetection");

        let err = validate_service_names(&function, &connector).unwrap_err();
        match err {
            FleetError::ServiceNameMismatch {
                function, connector, ..
            } => {
                assert_eq!(function, "object-detection");
                assert_eq!(connector, "objectdetection");
            }
            other => panic!("expected ServiceNameMismatch, got {other:?}"),
        }
    }

    #[test]
    fn connector_without_service_name_fails_validation() {
        let function = FunctionBuilder::new(
            "ObjectDetection",
            Arn::new("arn:aws:lambda:us-west-2:1:function:ObjectDetection:prod"),
        )
        .service_name("object-detection")
        .build();

        let connector = ConnectorBuilder::new(
            "ObjectDetectionConnectorTX2",
            Arn::new("arn:aws:greengrass:::connectors/ObjectDetectionAarch64TX2/1"),
        )
        .build();

        assert!(validate_service_names(&function, &connector).is_err());
    }

    #[test]
    fn function_builder_defaults() {
        let function = FunctionBuilder::new(
            "ObjectDetection",
            Arn::new("arn:aws:lambda:us-west-2:1:function:ObjectDetection:prod"),
        )
        .build();

        assert_eq!(function.isolation, IsolationMode::Container);
        assert_eq!(function.memory_kb, 98304);
        assert!(function.pinned);
    }

    #[test]
    fn connector_builder_collects_parameters() {
        let (_, connector) = object_detection_pair("svc", "svc");

        assert_eq!(
            connector.parameters.get("MLModelResourceId").map(String::as_str),
            Some("my-ml-resource")
        );
        assert_eq!(
            connector
                .parameters
                .get("MLModelDestinationPath")
                .map(String::as_str),
            Some("/ml_model")
        );
        assert_eq!(
            connector.parameters.get("GPUAcceleration").map(String::as_str),
            Some("GPU")
        );
    }
}
