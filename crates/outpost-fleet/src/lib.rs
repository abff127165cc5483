//! Fleet provisioning for outpost.
//!
//! Creates the cloud-side description of an edge device: the group, the
//! core identity (certificate and keys), the security policy, and the
//! resource/function/connector definitions that a group version snapshots
//! for deployment.
//!
//! Provisioning is an irreversible chain, not a transaction: every create
//! call leaves a cloud-side resource behind, and a failure partway leaves
//! the earlier resources in place for out-of-band cleanup.

pub mod api;
pub mod definitions;
pub mod error;
pub mod http;
pub mod identity;
pub mod manifest;
pub mod provision;
pub mod types;
pub mod version;

pub use api::{FleetApi, MockFleetApi};
pub use error::{FleetError, FleetResult};
pub use http::HttpFleetApi;
pub use manifest::ProvisionManifest;
pub use provision::{GroupProvisioner, ProvisionRequest, ProvisionedCore};
pub use types::{
    CertificateBundle, ConnectorDefinition, CoreDefinitionSpec, DefinitionVersion,
    FunctionDefinition, GroupRecord, GroupVersionRecord, GroupVersionRefs, IsolationMode, KeyPair,
    Permission, PolicyDocument, PolicyRecord, ResourceAccess, ResourceDefinition, ThingRecord,
};
pub use version::compose_group_version;
