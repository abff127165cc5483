//! Shared types for the outpost provisioning workflow.
//!
//! This crate carries the pieces every stage of the workflow needs: the
//! identifier newtypes that thread from step to step, the explicit cloud
//! configuration passed to every component constructor, and the bounded
//! wait primitive used wherever an external service is polled.

pub mod config;
pub mod error;
pub mod types;
pub mod wait;

pub use config::{CloudConfig, CredentialsConfig, EndpointConfig, PollConfig};
pub use error::{CoreError, CoreResult};
pub use types::{Accelerator, Arn, DeploymentId, GroupId, TargetDevice, ThingName};
pub use wait::{WaitOutcome, WaitPlan};
