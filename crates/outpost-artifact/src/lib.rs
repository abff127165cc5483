//! Model artifact preparation for outpost.
//!
//! Covers the front half of the provisioning workflow: fetching a
//! pretrained model, packing its weight/definition files into a `.tar.gz`
//! archive, placing the archive at a deterministic object-storage path,
//! and submitting the compile job that produces the on-device artifact.

pub mod archive;
pub mod compile;
pub mod error;
pub mod fetch;
pub mod store;

pub use archive::{pack_model, unpack};
pub use compile::{CompileClient, CompileRequest, CompileStatus, CompiledArtifact};
pub use error::{ArtifactError, ArtifactResult};
pub use fetch::fetch_model;
pub use store::{ArtifactStore, ObjectUri, StorageBackend};
