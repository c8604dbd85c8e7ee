//! Rollout driver — the caller-side poll loop around the controller.
//!
//! The controller never waits for instances. The driver does: it scales
//! the group out, polls fresh snapshots until enough instances serve
//! traffic, then commits, or rolls back / abandons on timeout.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use fleetroll_state::{CapacityBounds, InstanceId};

use crate::config::{RolloutPolicy, TimeoutAction};
use crate::controller::DeploymentController;
use crate::error::RolloutResult;
use crate::port::FleetControlPort;

/// How a driven rollout ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloutOutcome {
    /// New generation healthy, old generation terminated.
    Committed,
    /// Timed out, new generation terminated.
    RolledBack,
    /// Timed out, group left scaled out with automation suspended.
    Abandoned,
}

/// Summary of one driven rollout.
#[derive(Debug, Clone, Serialize)]
pub struct RolloutReport {
    pub group: String,
    pub launch_version: String,
    pub outcome: RolloutOutcome,
    /// Bounds committed by scale-out.
    pub bounds: CapacityBounds,
    /// Serving instances seen by the last poll.
    pub serving: usize,
    pub terminated: Vec<InstanceId>,
    pub polls: u32,
    pub elapsed_ms: u64,
}

/// Drives one rollout of a group from scale-out to commit or rollback.
///
/// Callers must not run two drivers against the same group at once.
pub struct RolloutDriver<'a, P: FleetControlPort + ?Sized> {
    port: &'a P,
    policy: RolloutPolicy,
}

impl<'a, P: FleetControlPort + ?Sized> RolloutDriver<'a, P> {
    pub fn new(port: &'a P, policy: RolloutPolicy) -> Self {
        Self { port, policy }
    }

    /// Run a full rollout of `group`.
    ///
    /// Port failures abort the run immediately and are returned as-is;
    /// the group is left in whatever state the last successful command
    /// produced.
    pub async fn run(&self, group: &str) -> RolloutResult<RolloutReport> {
        let snapshot = self.port.list_group_state(group)?;
        snapshot.validate()?;

        let started = Instant::now();
        // A timeout past the end of the clock never expires.
        let deadline = started.checked_add(self.policy.timeout);

        let mut controller = DeploymentController::new(self.port);
        let bounds = controller.scale_out(&snapshot)?;
        let wanted = bounds.desired as usize;

        info!(
            group,
            launch_version = %snapshot.launch_version,
            wanted,
            timeout_ms = millis(self.policy.timeout),
            "waiting for new generation"
        );

        let mut polls = 0u32;
        let (ready, latest, serving) = loop {
            let latest = self.port.list_group_state(group)?;
            polls = polls.saturating_add(1);
            let serving = controller.count_running_instances(&latest);
            debug!(group, poll = polls, serving, wanted, "polled group");

            if serving >= wanted {
                break (true, latest, serving);
            }
            let pause = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break (false, latest, serving);
                    }
                    self.policy.poll_interval.min(deadline - now)
                }
                None => self.policy.poll_interval,
            };
            tokio::time::sleep(pause).await;
        };

        let (outcome, terminated) = if ready {
            (RolloutOutcome::Committed, controller.commit_update(&latest)?)
        } else {
            warn!(
                group,
                serving,
                wanted,
                action = ?self.policy.on_timeout,
                "new generation did not become healthy in time"
            );
            match self.policy.on_timeout {
                TimeoutAction::Rollback => {
                    (RolloutOutcome::RolledBack, controller.rollback(&latest)?)
                }
                TimeoutAction::Abandon => (RolloutOutcome::Abandoned, Vec::new()),
            }
        };

        let elapsed_ms = millis(started.elapsed());
        info!(
            group,
            outcome = ?outcome,
            terminated = terminated.len(),
            polls,
            elapsed_ms,
            "rollout finished"
        );

        Ok(RolloutReport {
            group: group.to_string(),
            launch_version: latest.launch_version,
            outcome,
            bounds,
            serving,
            terminated,
            polls,
            elapsed_ms,
        })
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
