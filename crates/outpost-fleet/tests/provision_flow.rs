//! End-to-end provisioning flow against in-memory service doubles.
//!
//! Mirrors the full workflow: package the model, upload it, provision the
//! group and identity, register the definitions, compose a group version,
//! and poll a deployment to success.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use outpost_artifact::{pack_model, ArtifactStore};
use outpost_core::{Accelerator, Arn, CloudConfig, GroupId, WaitPlan};
use outpost_deploy::{DeploymentMonitor, DeploymentStatus, ScriptedDeployApi};
use outpost_fleet::definitions::{
    model_resource, validate_service_names, ConnectorBuilder, FunctionBuilder,
};
use outpost_fleet::{
    compose_group_version, identity, FleetApi, GroupProvisioner, GroupVersionRefs, MockFleetApi,
    ProvisionManifest, ProvisionRequest,
};

#[tokio::test]
async fn full_workflow_ends_in_a_successful_deployment() {
    let work_dir = TempDir::new().unwrap();

    // Package model.json/model.params into mobilenet.tar.gz.
    let model_json = work_dir.path().join("model.json");
    let model_params = work_dir.path().join("model.params");
    std::fs::write(&model_json, r#"{"nodes": []}"#).unwrap();
    std::fs::write(&model_params, vec![7u8; 1024]).unwrap();

    let archive = work_dir.path().join("mobilenet.tar.gz");
    pack_model(&[model_json, model_params], &archive)
        .await
        .unwrap();

    // Upload to the bucket at the deterministic key.
    let store = ArtifactStore::with_store(
        Arc::new(object_store::memory::InMemory::new()),
        "my-bucket",
    );
    let key = ArtifactStore::model_key("mobilenet.tar.gz");
    let model_uri = store.upload(&archive, &key).await.unwrap();
    assert_eq!(model_uri.as_str(), "s3://my-bucket/models/mobilenet.tar.gz");

    // Provision group, identity, and policy through the chain.
    let api = Arc::new(MockFleetApi::new());
    let provisioner = GroupProvisioner::new(api.clone());
    let provisioned = provisioner
        .provision(&ProvisionRequest::named("camera-fleet"))
        .await
        .unwrap();

    let config = CloudConfig::default();
    let identity_dir = work_dir.path().join("identity");
    let identity_paths = identity::persist_identity(
        &identity_dir,
        provisioned.thing.name.as_str(),
        &provisioned.certificate,
        &provisioned.thing.arn,
        &config,
    )
    .await
    .unwrap();
    assert!(identity_paths.private_key.exists());

    // One resource, one function, one connector; names must agree.
    let compiled_uri = "s3://my-bucket/compiled/mobilenet-tx2.tar.gz";
    let resource = model_resource("my-ml-resource", "/ml_model", compiled_uri);

    let function = FunctionBuilder::new(
        "ObjectDetection",
        Arn::new("arn:aws:lambda:mock:function:ObjectDetection:prod"),
    )
    .read_access("my-ml-resource")
    .service_name("object-detection")
    .build();

    let connector = ConnectorBuilder::new(
        "ObjectDetectionConnectorTX2",
        Arn::new("arn:aws:greengrass:::connectors/ObjectDetectionAarch64TX2/1"),
    )
    .model("my-ml-resource", "/ml_model")
    .service_name("object-detection")
    .service_timeout_secs(10)
    .service_memory_kb(500_000)
    .accelerator(Accelerator::Gpu)
    .build();

    validate_service_names(&function, &connector).unwrap();

    let resource_version = api.create_resource_definition(&resource).await.unwrap();
    let function_version = api.create_function_definition(&function).await.unwrap();
    let connector_version = api.create_connector_definition(&connector).await.unwrap();

    // A group version snapshots exactly one of each definition.
    let refs = GroupVersionRefs {
        core_definition_version_arn: provisioned.core_definition.version_arn.clone(),
        resource_definition_version_arn: resource_version.version_arn.clone(),
        function_definition_version_arn: function_version.version_arn.clone(),
        connector_definition_version_arn: connector_version.version_arn.clone(),
    };
    let group_version = compose_group_version(api.as_ref(), &provisioned.group.id, &refs)
        .await
        .unwrap();

    // The manifest round-trips the exact identifiers used above.
    let manifest_path = ProvisionManifest::default_path(work_dir.path());
    let manifest = ProvisionManifest {
        model_archive_uri: Some(model_uri.as_str().to_owned()),
        compiled_artifact_uri: Some(compiled_uri.to_owned()),
        group_id: Some(provisioned.group.id.clone()),
        group_arn: Some(provisioned.group.arn.clone()),
        core_thing_name: Some(provisioned.thing.name.clone()),
        core_thing_arn: Some(provisioned.thing.arn.clone()),
        certificate_id: Some(provisioned.certificate.certificate_id.clone()),
        certificate_arn: Some(provisioned.certificate.certificate_arn.clone()),
        identity_paths: Some(identity_paths),
        policy_name: Some(provisioned.policy.name.clone()),
        core_definition_version_arn: Some(provisioned.core_definition.version_arn.clone()),
        resource_definition_version_arn: Some(resource_version.version_arn),
        function_definition_version_arn: Some(function_version.version_arn),
        connector_definition_version_arn: Some(connector_version.version_arn),
        group_version_id: Some(group_version.id.clone()),
        group_version_arn: Some(group_version.arn.clone()),
        deployment_id: None,
    };
    manifest.save(&manifest_path).await.unwrap();

    let reloaded = ProvisionManifest::load(&manifest_path).await.unwrap();
    assert_eq!(reloaded.group_id, manifest.group_id);
    assert_eq!(reloaded.certificate_arn, manifest.certificate_arn);
    assert_eq!(reloaded.require_version_refs().unwrap(), refs);

    // Deploy and poll: two in-progress observations, then success.
    let deploy_api = Arc::new(ScriptedDeployApi::new([
        DeploymentStatus::InProgress,
        DeploymentStatus::InProgress,
        DeploymentStatus::Success,
    ]));
    let monitor = DeploymentMonitor::new(deploy_api.clone());
    let plan = WaitPlan::new(Duration::from_millis(1));

    let group_id: GroupId = reloaded.group_id.clone().unwrap();
    let succeeded = monitor
        .run(&group_id, &group_version.id, &plan)
        .await
        .unwrap();

    assert_eq!(succeeded.state_name(), "succeeded");
    assert_eq!(deploy_api.status_calls(), 3);
}

#[tokio::test]
async fn group_version_carries_at_most_one_core() {
    let api = MockFleetApi::new();
    let group = api.create_group("camera-fleet").await.unwrap();

    let spec = outpost_fleet::CoreDefinitionSpec {
        thing_arn: Arn::new("arn:aws:iot:mock:thing/camera-fleet-core"),
        certificate_arn: Arn::new("arn:aws:iot:mock:cert/cert-0001"),
        sync_shadow: true,
    };
    api.create_core_definition(&group.id, &spec).await.unwrap();

    // The external service enforces one core per group.
    assert!(api.create_core_definition(&group.id, &spec).await.is_err());
}
