//! Deployment controller — drives the scale-out / commit / rollback protocol.
//!
//! A rollout doubles the group so a new generation of instances can boot
//! next to the old one, then either commits (retires the old generation
//! and hands the group back to its automation) or rolls back (retires the
//! new generation and leaves the automation suspended for an operator).
//!
//! The controller only issues commands. Waiting for instances to become
//! `InService` is the caller's job; see [`RolloutDriver`](crate::driver::RolloutDriver).

use tracing::{debug, info, warn};

use fleetroll_state::{CapacityBounds, GroupState, InstanceId};

use crate::error::RolloutResult;
use crate::port::FleetControlPort;
use crate::process::SCALE_OUT_PROCESSES;

/// Last transition performed by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolloutPhase {
    /// Nothing issued yet.
    Idle,
    /// Group grown to host a second generation.
    ScaledOut { bounds: CapacityBounds },
    /// Old generation terminated, automation restored.
    Committed { terminated: usize },
    /// New generation terminated, automation still suspended.
    RolledBack { terminated: usize },
}

/// Issues rollout commands for one elastic group against a control plane.
///
/// Every operation acts on the snapshot it is handed and never keeps it;
/// pass a freshly listed [`GroupState`] to each call.
pub struct DeploymentController<'a, P: FleetControlPort + ?Sized> {
    port: &'a P,
    phase: RolloutPhase,
}

impl<'a, P: FleetControlPort + ?Sized> DeploymentController<'a, P> {
    /// Create a controller issuing commands through `port`.
    pub fn new(port: &'a P) -> Self {
        Self {
            port,
            phase: RolloutPhase::Idle,
        }
    }

    /// The last transition this controller performed.
    pub fn phase(&self) -> &RolloutPhase {
        &self.phase
    }

    /// Grow the group so a full new generation can boot alongside the old.
    ///
    /// Suspends all automation first so the control plane cannot react to
    /// the capacity change, commits the scaled-out bounds, then resumes
    /// only [`SCALE_OUT_PROCESSES`]. Returns the bounds that were committed.
    pub fn scale_out(&mut self, group: &GroupState) -> RolloutResult<CapacityBounds> {
        let current = group.bounds();
        let target = current.scaled_out();

        self.port.suspend_all_processes(&group.name)?;
        debug!(group = %group.name, "suspended all processes");

        self.port
            .update_group_capacity(&group.name, target.min, target.max, target.desired)?;
        info!(
            group = %group.name,
            from = %current,
            to = %target,
            "scaled out group"
        );

        self.port
            .resume_processes(&group.name, Some(SCALE_OUT_PROCESSES.as_slice()))?;
        debug!(
            group = %group.name,
            processes = ?SCALE_OUT_PROCESSES,
            "resumed scale-out processes"
        );

        self.phase = RolloutPhase::ScaledOut { bounds: target };
        Ok(target)
    }

    /// Retire the old generation and restore full automation.
    ///
    /// Terminates every instance whose launch version differs from the
    /// group's target, in snapshot order. The terminate call is issued
    /// even when nothing is old. Returns the terminated ids.
    pub fn commit_update(&mut self, group: &GroupState) -> RolloutResult<Vec<InstanceId>> {
        let old = group.old_generation();
        info!(
            group = %group.name,
            launch_version = %group.launch_version,
            count = old.len(),
            "committing update, terminating old generation"
        );
        self.terminate_instances(&old)?;

        self.port.resume_processes(&group.name, None)?;
        debug!(group = %group.name, "resumed all processes");

        self.phase = RolloutPhase::Committed {
            terminated: old.len(),
        };
        Ok(old)
    }

    /// Retire the new generation and keep automation suspended.
    ///
    /// Terminates every instance running the group's target launch
    /// version. Processes are not resumed: the group has not reached a
    /// committed state and an operator decides how to continue.
    pub fn rollback(&mut self, group: &GroupState) -> RolloutResult<Vec<InstanceId>> {
        let new = group.new_generation();
        warn!(
            group = %group.name,
            launch_version = %group.launch_version,
            count = new.len(),
            "rolling back update, terminating new generation"
        );
        self.terminate_instances(&new)?;

        self.phase = RolloutPhase::RolledBack {
            terminated: new.len(),
        };
        Ok(new)
    }

    /// Number of instances in the snapshot that can serve traffic.
    pub fn count_running_instances(&self, group: &GroupState) -> usize {
        group.serving_count()
    }

    fn terminate_instances(&self, instance_ids: &[InstanceId]) -> RolloutResult<()> {
        self.port.terminate_instances(instance_ids, false)?;
        Ok(())
    }
}
