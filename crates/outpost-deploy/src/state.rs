//! Typestate machine for deployment rollout.
//!
//! Encodes the rollout lifecycle in the type system so invalid
//! transitions fail to compile:
//!
//! ```text
//! Deployment<Requested> -> Deployment<InProgress> -> Deployment<Succeeded>
//!                                                 -> Deployment<Failed>
//! ```

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use outpost_core::DeploymentId;

/// Rollout status as reported by the deployment service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentStatus {
    /// Deployment request accepted, rollout not yet started.
    Requested,
    /// Rollout running on the device.
    InProgress,
    /// Rollout completed successfully. Terminal.
    Success,
    /// Rollout failed. Terminal.
    Failed,
    /// A status string this client does not recognise; treated as
    /// non-terminal so newer service states keep the poll alive.
    #[serde(other)]
    Unknown,
}

impl DeploymentStatus {
    /// Whether this status ends polling.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// Marker trait for rollout states.
pub trait RolloutState: private::Sealed + Send + Sync {
    /// State name for logging.
    fn name() -> &'static str;
}

mod private {
    pub trait Sealed {}
}

/// Deployment request issued, first status not yet observed.
#[derive(Debug, Clone, Copy)]
pub struct Requested;

/// Rollout observed in progress.
#[derive(Debug, Clone, Copy)]
pub struct InProgress;

/// Rollout succeeded.
#[derive(Debug, Clone, Copy)]
pub struct Succeeded;

/// Rollout failed.
#[derive(Debug, Clone, Copy)]
pub struct Failed;

impl private::Sealed for Requested {}
impl private::Sealed for InProgress {}
impl private::Sealed for Succeeded {}
impl private::Sealed for Failed {}

impl RolloutState for Requested {
    fn name() -> &'static str {
        "requested"
    }
}

impl RolloutState for InProgress {
    fn name() -> &'static str {
        "in_progress"
    }
}

impl RolloutState for Succeeded {
    fn name() -> &'static str {
        "succeeded"
    }
}

impl RolloutState for Failed {
    fn name() -> &'static str {
        "failed"
    }
}

/// A deployment in a specific rollout state.
#[derive(Debug)]
pub struct Deployment<S: RolloutState> {
    id: DeploymentId,
    error: Option<String>,
    _state: PhantomData<S>,
}

impl<S: RolloutState> Deployment<S> {
    /// The deployment ID.
    #[must_use]
    pub const fn id(&self) -> &DeploymentId {
        &self.id
    }

    /// The state name.
    #[must_use]
    pub fn state_name(&self) -> &'static str {
        S::name()
    }

    fn transition<T: RolloutState>(self) -> Deployment<T> {
        Deployment {
            id: self.id,
            error: self.error,
            _state: PhantomData,
        }
    }
}

impl Deployment<Requested> {
    /// Record a newly issued deployment request.
    #[must_use]
    pub const fn new(id: DeploymentId) -> Self {
        Self {
            id,
            error: None,
            _state: PhantomData,
        }
    }

    /// First non-terminal status observed.
    #[must_use]
    pub fn start(self) -> Deployment<InProgress> {
        self.transition()
    }

    /// The service reported success before any in-progress observation.
    #[must_use]
    pub fn succeed(self) -> Deployment<Succeeded> {
        self.transition()
    }

    /// The service reported failure before any in-progress observation.
    #[must_use]
    pub fn fail(mut self, reason: String) -> Deployment<Failed> {
        self.error = Some(reason);
        self.transition()
    }
}

impl Deployment<InProgress> {
    /// Terminal success observed.
    #[must_use]
    pub fn succeed(self) -> Deployment<Succeeded> {
        self.transition()
    }

    /// Terminal failure observed.
    #[must_use]
    pub fn fail(mut self, reason: String) -> Deployment<Failed> {
        self.error = Some(reason);
        self.transition()
    }
}

impl Deployment<Failed> {
    /// The failure reason reported by the service.
    #[must_use]
    pub fn reason(&self) -> &str {
        self.error.as_deref().unwrap_or("no reason reported")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions() {
        let requested = Deployment::<Requested>::new(DeploymentId::new("dep-1"));
        assert_eq!(requested.state_name(), "requested");

        let in_progress = requested.start();
        assert_eq!(in_progress.state_name(), "in_progress");

        let succeeded = in_progress.succeed();
        assert_eq!(succeeded.state_name(), "succeeded");
        assert_eq!(succeeded.id().as_str(), "dep-1");
    }

    #[test]
    fn failure_keeps_the_reason() {
        let requested = Deployment::<Requested>::new(DeploymentId::new("dep-1"));
        let failed = requested.start().fail("device unreachable".to_owned());

        assert_eq!(failed.state_name(), "failed");
        assert_eq!(failed.reason(), "device unreachable");
    }

    #[test]
    fn status_terminality() {
        assert!(DeploymentStatus::Success.is_terminal());
        assert!(DeploymentStatus::Failed.is_terminal());
        assert!(!DeploymentStatus::InProgress.is_terminal());
        assert!(!DeploymentStatus::Requested.is_terminal());
        assert!(!DeploymentStatus::Unknown.is_terminal());
    }

    #[test]
    fn unknown_status_strings_parse_as_unknown() {
        let status: DeploymentStatus = serde_json::from_str("\"Building\"").unwrap();
        assert_eq!(status, DeploymentStatus::Unknown);
        assert!(!status.is_terminal());
    }
}
