//! In-memory control plane.
//!
//! `InMemoryFleet` implements [`FleetControlPort`] over groups held in a
//! mutex. It models just enough of a real control plane to drive a full
//! rollout locally:
//!
//! - capacity updates, and resuming `Launch`, bring the group up to its
//!   desired capacity with `Pending` instances of the current launch version
//! - [`tick`](InMemoryFleet::tick) advances `Pending` instances to
//!   `InService` and drops terminated ones
//! - every successful port call is journaled for assertions

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use fleetroll_state::{GroupState, InstanceId, InstanceRecord, LifecycleState};

use crate::error::PortError;
use crate::port::FleetControlPort;
use crate::process::ScalingProcess;

/// One journaled port call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FleetCall {
    SuspendAll {
        group: String,
    },
    Resume {
        group: String,
        processes: Option<Vec<ScalingProcess>>,
    },
    UpdateCapacity {
        group: String,
        min: u32,
        max: u32,
        desired: u32,
    },
    Terminate {
        instance_ids: Vec<InstanceId>,
        decrement_desired_capacity: bool,
    },
    List {
        group: String,
    },
}

struct GroupEntry {
    state: GroupState,
    suspended: HashSet<ScalingProcess>,
    stall_boot: bool,
}

#[derive(Default)]
struct FleetInner {
    groups: HashMap<String, GroupEntry>,
    calls: Vec<FleetCall>,
    next_instance: u64,
    fail_next: Option<PortError>,
}

impl FleetInner {
    fn take_failure(&mut self) -> Result<(), PortError> {
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn group_mut(&mut self, group: &str) -> Result<&mut GroupEntry, PortError> {
        self.groups
            .get_mut(group)
            .ok_or_else(|| PortError::GroupNotFound(group.to_string()))
    }

    fn launch_to_desired(&mut self, group: &str) -> Result<usize, PortError> {
        let mut next = self.next_instance;
        let entry = self.group_mut(group)?;
        if entry.suspended.contains(&ScalingProcess::Launch) {
            return Ok(0);
        }

        let live = entry
            .state
            .instances
            .iter()
            .filter(|i| !i.lifecycle_state.is_retiring())
            .count();
        let missing = (entry.state.desired_capacity as usize).saturating_sub(live);
        for _ in 0..missing {
            next += 1;
            entry.state.instances.push(InstanceRecord {
                instance_id: format!("i-{next:08x}"),
                launch_version: entry.state.launch_version.clone(),
                lifecycle_state: LifecycleState::Pending,
            });
        }

        self.next_instance = next;
        Ok(missing)
    }
}

/// A control plane whose groups live in process memory.
#[derive(Default)]
pub struct InMemoryFleet {
    inner: Mutex<FleetInner>,
}

impl InMemoryFleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a group. Its automation starts fully active.
    pub fn with_group(self, group: GroupState) -> Self {
        self.insert_group(group);
        self
    }

    pub fn insert_group(&self, group: GroupState) {
        let mut inner = self.lock();
        inner.groups.insert(
            group.name.clone(),
            GroupEntry {
                state: group,
                suspended: HashSet::new(),
                stall_boot: false,
            },
        );
    }

    /// Switch the launch version future instances are created from.
    pub fn set_launch_version(&self, group: &str, version: &str) -> Result<(), PortError> {
        let mut inner = self.lock();
        let entry = inner.group_mut(group)?;
        entry.state.launch_version = version.to_string();
        debug!(group, version, "launch version switched");
        Ok(())
    }

    /// Keep new instances in `Pending` forever.
    pub fn set_stall_boot(&self, group: &str, stall: bool) -> Result<(), PortError> {
        let mut inner = self.lock();
        inner.group_mut(group)?.stall_boot = stall;
        Ok(())
    }

    /// Fail the next port call with `err`.
    pub fn fail_next(&self, err: PortError) {
        self.lock().fail_next = Some(err);
    }

    /// Advance every group by one boot/retire step.
    ///
    /// Terminated instances are removed and pending ones become
    /// `InService`, unless booting is stalled.
    pub fn tick(&self) {
        let mut inner = self.lock();
        for (name, entry) in inner.groups.iter_mut() {
            let before = entry.state.instances.len();
            entry
                .state
                .instances
                .retain(|i| i.lifecycle_state != LifecycleState::Terminated);
            let removed = before - entry.state.instances.len();

            let mut booted = 0;
            if !entry.stall_boot {
                for instance in entry.state.instances.iter_mut() {
                    if instance.lifecycle_state.is_pending() {
                        instance.lifecycle_state = LifecycleState::InService;
                        booted += 1;
                    }
                }
            }

            if removed > 0 || booted > 0 {
                debug!(group = %name, removed, booted, "fleet tick");
            }
        }
    }

    /// Current state of a group, without journaling a call.
    pub fn group(&self, group: &str) -> Option<GroupState> {
        self.lock().groups.get(group).map(|e| e.state.clone())
    }

    /// Processes currently suspended on a group.
    pub fn suspended_processes(&self, group: &str) -> Vec<ScalingProcess> {
        let inner = self.lock();
        let Some(entry) = inner.groups.get(group) else {
            return Vec::new();
        };
        ScalingProcess::ALL
            .into_iter()
            .filter(|p| entry.suspended.contains(p))
            .collect()
    }

    /// Every successful port call so far, oldest first.
    pub fn calls(&self) -> Vec<FleetCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FleetInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FleetControlPort for InMemoryFleet {
    fn suspend_all_processes(&self, group: &str) -> Result<(), PortError> {
        let mut inner = self.lock();
        inner.take_failure()?;
        let entry = inner.group_mut(group)?;
        entry.suspended = ScalingProcess::ALL.into_iter().collect();
        inner.calls.push(FleetCall::SuspendAll {
            group: group.to_string(),
        });
        Ok(())
    }

    fn resume_processes(
        &self,
        group: &str,
        processes: Option<&[ScalingProcess]>,
    ) -> Result<(), PortError> {
        let mut inner = self.lock();
        inner.take_failure()?;
        let entry = inner.group_mut(group)?;
        match processes {
            Some(list) => {
                for process in list {
                    entry.suspended.remove(process);
                }
            }
            None => entry.suspended.clear(),
        }
        let launched = inner.launch_to_desired(group)?;
        if launched > 0 {
            debug!(group, launched, "launched instances on resume");
        }
        inner.calls.push(FleetCall::Resume {
            group: group.to_string(),
            processes: processes.map(<[_]>::to_vec),
        });
        Ok(())
    }

    fn update_group_capacity(
        &self,
        group: &str,
        min_size: u32,
        max_size: u32,
        desired_capacity: u32,
    ) -> Result<(), PortError> {
        let mut inner = self.lock();
        inner.take_failure()?;
        let entry = inner.group_mut(group)?;
        entry.state.min_size = min_size;
        entry.state.max_size = max_size;
        entry.state.desired_capacity = desired_capacity;
        let launched = inner.launch_to_desired(group)?;
        inner.calls.push(FleetCall::UpdateCapacity {
            group: group.to_string(),
            min: min_size,
            max: max_size,
            desired: desired_capacity,
        });
        debug!(group, min_size, max_size, desired_capacity, launched, "capacity updated");
        Ok(())
    }

    fn terminate_instances(
        &self,
        instance_ids: &[InstanceId],
        decrement_desired_capacity: bool,
    ) -> Result<(), PortError> {
        let mut inner = self.lock();
        inner.take_failure()?;
        for entry in inner.groups.values_mut() {
            let state = &mut entry.state;
            let mut terminated = 0u32;
            for instance in state.instances.iter_mut() {
                if instance.lifecycle_state != LifecycleState::Terminated
                    && instance_ids.contains(&instance.instance_id)
                {
                    instance.lifecycle_state = LifecycleState::Terminated;
                    terminated += 1;
                }
            }
            if decrement_desired_capacity && terminated > 0 {
                state.desired_capacity = state
                    .desired_capacity
                    .saturating_sub(terminated)
                    .max(state.min_size);
            }
        }
        inner.calls.push(FleetCall::Terminate {
            instance_ids: instance_ids.to_vec(),
            decrement_desired_capacity,
        });
        Ok(())
    }

    fn list_group_state(&self, group: &str) -> Result<GroupState, PortError> {
        let mut inner = self.lock();
        inner.take_failure()?;
        let state = inner.group_mut(group)?.state.clone();
        inner.calls.push(FleetCall::List {
            group: group.to_string(),
        });
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> InMemoryFleet {
        InMemoryFleet::new().with_group(GroupState {
            name: "web".to_string(),
            launch_version: "web-lc-1".to_string(),
            min_size: 1,
            max_size: 2,
            desired_capacity: 1,
            instances: vec![InstanceRecord {
                instance_id: "i-old".to_string(),
                launch_version: "web-lc-1".to_string(),
                lifecycle_state: LifecycleState::InService,
            }],
        })
    }

    #[test]
    fn capacity_update_launches_pending_instances() {
        let fleet = seeded();
        fleet.set_launch_version("web", "web-lc-2").unwrap();

        fleet.update_group_capacity("web", 2, 3, 2).unwrap();

        let group = fleet.group("web").unwrap();
        assert_eq!(group.instances.len(), 2);
        let launched = &group.instances[1];
        assert_eq!(launched.launch_version, "web-lc-2");
        assert_eq!(launched.lifecycle_state, LifecycleState::Pending);
    }

    #[test]
    fn no_launch_while_launch_suspended() {
        let fleet = seeded();
        fleet.suspend_all_processes("web").unwrap();

        fleet.update_group_capacity("web", 2, 3, 2).unwrap();

        assert_eq!(fleet.group("web").unwrap().instances.len(), 1);
    }

    #[test]
    fn resuming_launch_fills_up_to_desired() {
        let fleet = seeded();
        fleet.suspend_all_processes("web").unwrap();
        fleet.update_group_capacity("web", 2, 3, 2).unwrap();

        fleet
            .resume_processes("web", Some([ScalingProcess::Launch].as_slice()))
            .unwrap();

        let group = fleet.group("web").unwrap();
        assert_eq!(group.instances.len(), 2);
        assert!(group.instances[1].lifecycle_state.is_pending());
    }

    #[test]
    fn tick_boots_pending_and_drops_terminated() {
        let fleet = seeded();
        fleet.update_group_capacity("web", 2, 3, 2).unwrap();
        fleet.terminate_instances(&["i-old".to_string()], false).unwrap();

        fleet.tick();

        let group = fleet.group("web").unwrap();
        assert_eq!(group.instances.len(), 1);
        assert_eq!(group.instances[0].lifecycle_state, LifecycleState::InService);
    }

    #[test]
    fn stalled_boot_keeps_instances_pending() {
        let fleet = seeded();
        fleet.set_stall_boot("web", true).unwrap();
        fleet.update_group_capacity("web", 2, 3, 2).unwrap();

        fleet.tick();

        assert_eq!(fleet.group("web").unwrap().serving_count(), 1);
    }

    #[test]
    fn terminate_empty_set_changes_nothing() {
        let fleet = seeded();
        let before = fleet.group("web").unwrap();

        fleet.terminate_instances(&[], false).unwrap();
        fleet.tick();

        assert_eq!(fleet.group("web").unwrap(), before);
        assert_eq!(
            fleet.calls(),
            vec![FleetCall::Terminate {
                instance_ids: vec![],
                decrement_desired_capacity: false,
            }]
        );
    }

    #[test]
    fn terminate_ignores_unknown_ids() {
        let fleet = seeded();
        fleet.terminate_instances(&["i-ghost".to_string()], false).unwrap();
        assert_eq!(fleet.group("web").unwrap().serving_count(), 1);
    }

    #[test]
    fn terminate_can_decrement_desired_capacity() {
        let fleet = seeded();
        fleet.update_group_capacity("web", 0, 3, 2).unwrap();

        fleet.terminate_instances(&["i-old".to_string()], true).unwrap();

        assert_eq!(fleet.group("web").unwrap().desired_capacity, 1);
    }

    #[test]
    fn suspend_then_partial_resume() {
        let fleet = seeded();
        fleet.suspend_all_processes("web").unwrap();
        fleet
            .resume_processes("web", Some([ScalingProcess::Launch, ScalingProcess::HealthCheck].as_slice()))
            .unwrap();

        let suspended = fleet.suspended_processes("web");
        assert!(!suspended.contains(&ScalingProcess::Launch));
        assert!(!suspended.contains(&ScalingProcess::HealthCheck));
        assert!(suspended.contains(&ScalingProcess::ScheduledActions));
        assert_eq!(suspended.len(), ScalingProcess::ALL.len() - 2);

        fleet.resume_processes("web", None).unwrap();
        assert!(fleet.suspended_processes("web").is_empty());
    }

    #[test]
    fn unknown_group_is_not_found() {
        let fleet = seeded();
        assert_eq!(
            fleet.list_group_state("db"),
            Err(PortError::GroupNotFound("db".to_string()))
        );
    }

    #[test]
    fn injected_failure_hits_next_call_only() {
        let fleet = seeded();
        fleet.fail_next(PortError::Transport("timeout".to_string()));

        assert!(fleet.suspend_all_processes("web").is_err());
        assert!(fleet.suspend_all_processes("web").is_ok());
        assert_eq!(fleet.calls().len(), 1);
    }
}
