//! The control-plane capability consumed by the rollout controller.

use fleetroll_state::{GroupState, InstanceId};

use crate::error::PortError;
use crate::process::ScalingProcess;

/// Write (and snapshot-read) access to an elastic group's control plane.
///
/// Implementations wrap a real cloud client; tests and the CLI use
/// [`InMemoryFleet`](crate::memory::InMemoryFleet). Every call is
/// synchronous and returns once the control plane acknowledged it.
pub trait FleetControlPort {
    /// Suspend every automatic process of the group. Idempotent.
    fn suspend_all_processes(&self, group: &str) -> Result<(), PortError>;

    /// Resume the given processes, or all of them when `processes` is `None`.
    fn resume_processes(
        &self,
        group: &str,
        processes: Option<&[ScalingProcess]>,
    ) -> Result<(), PortError>;

    /// Commit new capacity bounds for the group.
    fn update_group_capacity(
        &self,
        group: &str,
        min_size: u32,
        max_size: u32,
        desired_capacity: u32,
    ) -> Result<(), PortError>;

    /// Terminate the given instances. An empty slice is a no-op.
    fn terminate_instances(
        &self,
        instance_ids: &[InstanceId],
        decrement_desired_capacity: bool,
    ) -> Result<(), PortError>;

    /// Read a fresh snapshot of the group.
    fn list_group_state(&self, group: &str) -> Result<GroupState, PortError>;
}
