//! Domain types for elastic group snapshots.
//!
//! These types describe a point-in-time view of an elastic instance group
//! as reported by the control plane: its capacity bounds, its target launch
//! version, and the instances currently attached to it. All types are
//! serializable to/from JSON so snapshots can be stored as files.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{StateError, StateResult};

/// Opaque identifier of an instance, unique within its group.
pub type InstanceId = String;

/// Name of an elastic instance group.
pub type GroupName = String;

// ── Group ─────────────────────────────────────────────────────────

/// Snapshot of an elastic instance group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupState {
    pub name: GroupName,
    /// Launch version new instances are created from.
    pub launch_version: String,
    pub min_size: u32,
    pub max_size: u32,
    pub desired_capacity: u32,
    #[serde(default)]
    pub instances: Vec<InstanceRecord>,
}

/// One member of an elastic group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceRecord {
    pub instance_id: InstanceId,
    /// Launch version this instance was created from.
    pub launch_version: String,
    pub lifecycle_state: LifecycleState,
}

/// Min/max/desired capacity triple of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityBounds {
    pub min: u32,
    pub max: u32,
    pub desired: u32,
}

impl CapacityBounds {
    /// Bounds that make room for a second, equally sized generation.
    ///
    /// `min` and `desired` double; `max` grows by the same amount as
    /// `desired`, so a consistent triple stays consistent.
    pub fn scaled_out(self) -> Self {
        Self {
            min: self.min.saturating_mul(2),
            max: self.max.saturating_add(self.desired),
            desired: self.desired.saturating_mul(2),
        }
    }

    /// Whether `min <= desired <= max` holds.
    pub fn is_consistent(&self) -> bool {
        self.min <= self.desired && self.desired <= self.max
    }
}

impl fmt::Display for CapacityBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min={} max={} desired={}",
            self.min, self.max, self.desired
        )
    }
}

impl GroupState {
    /// Current capacity bounds.
    pub fn bounds(&self) -> CapacityBounds {
        CapacityBounds {
            min: self.min_size,
            max: self.max_size,
            desired: self.desired_capacity,
        }
    }

    /// Check the baseline `min <= desired <= max` invariant.
    ///
    /// The deployment controller does not call this; callers validate a
    /// snapshot before driving a rollout with it.
    pub fn validate(&self) -> StateResult<()> {
        let bounds = self.bounds();
        if bounds.is_consistent() {
            Ok(())
        } else {
            Err(StateError::InvalidCapacity {
                group: self.name.clone(),
                min: bounds.min,
                desired: bounds.desired,
                max: bounds.max,
            })
        }
    }

    /// Ids of instances not running the target launch version, in
    /// snapshot order.
    pub fn old_generation(&self) -> Vec<InstanceId> {
        self.instances
            .iter()
            .filter(|i| i.launch_version != self.launch_version)
            .map(|i| i.instance_id.clone())
            .collect()
    }

    /// Ids of instances running the target launch version, in snapshot
    /// order.
    pub fn new_generation(&self) -> Vec<InstanceId> {
        self.instances
            .iter()
            .filter(|i| i.launch_version == self.launch_version)
            .map(|i| i.instance_id.clone())
            .collect()
    }

    /// Number of instances able to receive traffic right now.
    pub fn serving_count(&self) -> usize {
        self.instances
            .iter()
            .filter(|i| i.lifecycle_state.is_serving())
            .count()
    }
}

// ── Lifecycle ─────────────────────────────────────────────────────

/// Position of an instance in its provisioning/retirement lifecycle.
///
/// Labels the control plane reports that are not part of the standard set
/// are kept verbatim in [`LifecycleState::Unrecognized`] instead of failing
/// the whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LifecycleState {
    Pending,
    PendingWait,
    PendingProceed,
    InService,
    Terminating,
    TerminatingWait,
    TerminatingProceed,
    Terminated,
    Detaching,
    Detached,
    EnteringStandby,
    Standby,
    Unrecognized(String),
}

impl LifecycleState {
    /// The control-plane label for this state.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::PendingWait => "Pending:Wait",
            Self::PendingProceed => "Pending:Proceed",
            Self::InService => "InService",
            Self::Terminating => "Terminating",
            Self::TerminatingWait => "Terminating:Wait",
            Self::TerminatingProceed => "Terminating:Proceed",
            Self::Terminated => "Terminated",
            Self::Detaching => "Detaching",
            Self::Detached => "Detached",
            Self::EnteringStandby => "EnteringStandby",
            Self::Standby => "Standby",
            Self::Unrecognized(label) => label,
        }
    }

    /// Whether an instance in this state can serve load-balanced traffic.
    ///
    /// Only `InService` qualifies. Unrecognized labels never count.
    /// Booting, terminating and unknown instances are not counted, so a
    /// mixed fleet reports fewer running instances than it has attached.
    pub fn is_serving(&self) -> bool {
        matches!(self, Self::InService)
    }

    /// Whether the instance is still booting.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::Pending | Self::PendingWait | Self::PendingProceed
        )
    }

    /// Whether the instance is on its way out of the group (or gone).
    pub fn is_retiring(&self) -> bool {
        matches!(
            self,
            Self::Terminating
                | Self::TerminatingWait
                | Self::TerminatingProceed
                | Self::Terminated
                | Self::Detaching
                | Self::Detached
        )
    }
}

impl From<&str> for LifecycleState {
    fn from(label: &str) -> Self {
        match label {
            "Pending" => Self::Pending,
            "Pending:Wait" => Self::PendingWait,
            "Pending:Proceed" => Self::PendingProceed,
            "InService" => Self::InService,
            "Terminating" => Self::Terminating,
            "Terminating:Wait" => Self::TerminatingWait,
            "Terminating:Proceed" => Self::TerminatingProceed,
            "Terminated" => Self::Terminated,
            "Detaching" => Self::Detaching,
            "Detached" => Self::Detached,
            "EnteringStandby" => Self::EnteringStandby,
            "Standby" => Self::Standby,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for LifecycleState {
    fn from(label: String) -> Self {
        Self::from(label.as_str())
    }
}

impl From<LifecycleState> for String {
    fn from(state: LifecycleState) -> Self {
        match state {
            LifecycleState::Unrecognized(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
