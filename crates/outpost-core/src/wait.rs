//! Bounded, cancellable waiting between poll attempts.
//!
//! Every poll loop in outpost pauses through a [`WaitPlan`] instead of a
//! bare sleep, so polling is always bounded by a deadline and responsive
//! to cancellation.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::PollConfig;

/// Outcome of a single pause between poll attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The interval elapsed; the caller may poll again.
    Waited,
    /// The overall deadline was reached during the pause.
    DeadlineExceeded,
    /// The wait was cancelled.
    Cancelled,
}

/// A polling schedule: fixed interval, optional overall deadline, and a
/// cancellation token.
#[derive(Debug, Clone)]
pub struct WaitPlan {
    interval: Duration,
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl WaitPlan {
    /// Create a plan with a fixed interval and no deadline.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Create a plan from polling configuration.
    ///
    /// The configured deadline starts counting from this call.
    #[must_use]
    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(Duration::from_secs(config.interval_secs))
            .with_deadline(Duration::from_secs(config.deadline_secs))
    }

    /// Bound the total polling time, measured from now.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(Instant::now() + deadline);
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The fixed interval between poll attempts.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the deadline has already passed.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Pause for one interval.
    ///
    /// Returns early with [`WaitOutcome::DeadlineExceeded`] if the deadline
    /// lands inside the pause, or [`WaitOutcome::Cancelled`] if the token
    /// fires first.
    pub async fn pause(&self) -> WaitOutcome {
        let sleep_until = match self.deadline {
            Some(deadline) => {
                let next = Instant::now() + self.interval;
                if deadline <= next {
                    // Sleep out the remaining budget, then report expiry.
                    tokio::select! {
                        () = self.cancel.cancelled() => return WaitOutcome::Cancelled,
                        () = tokio::time::sleep_until(deadline) => {
                            return WaitOutcome::DeadlineExceeded;
                        }
                    }
                }
                next
            }
            None => Instant::now() + self.interval,
        };

        tokio::select! {
            () = self.cancel.cancelled() => WaitOutcome::Cancelled,
            () = tokio::time::sleep_until(sleep_until) => WaitOutcome::Waited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pause_without_deadline_waits() {
        let plan = WaitPlan::new(Duration::from_millis(5));
        assert_eq!(plan.pause().await, WaitOutcome::Waited);
    }

    #[tokio::test]
    async fn deadline_inside_pause_reports_expiry() {
        let plan =
            WaitPlan::new(Duration::from_secs(60)).with_deadline(Duration::from_millis(10));
        assert_eq!(plan.pause().await, WaitOutcome::DeadlineExceeded);
        assert!(plan.expired());
    }

    #[tokio::test]
    async fn cancellation_wins_over_sleep() {
        let cancel = CancellationToken::new();
        let plan = WaitPlan::new(Duration::from_secs(60)).with_cancel(cancel.clone());

        cancel.cancel();
        assert_eq!(plan.pause().await, WaitOutcome::Cancelled);
    }

    #[tokio::test]
    async fn expired_is_false_before_deadline() {
        let plan = WaitPlan::new(Duration::from_millis(1)).with_deadline(Duration::from_secs(60));
        assert!(!plan.expired());
    }
}
