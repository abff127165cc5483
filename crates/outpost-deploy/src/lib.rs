//! Deployment creation and monitoring for outpost.
//!
//! The final stage of the workflow: push a group version to the device
//! and poll the rollout status until it reaches a terminal state. Success
//! ends the workflow; failure aborts it with the service's reason; a
//! deployment that never terminates is bounded by the wait plan's
//! deadline instead of polling forever.

pub mod api;
pub mod error;
pub mod monitor;
pub mod state;

pub use api::{DeploymentApi, HttpDeploymentApi, ScriptedDeployApi, StatusReport};
pub use error::{DeployError, DeployResult};
pub use monitor::DeploymentMonitor;
pub use state::{Deployment, DeploymentStatus, Failed, InProgress, Requested, Succeeded};
