//! Automatic group-management processes.
//!
//! While a rollout is in flight the group's automation is suspended so it
//! cannot fight the manual membership changes. Scale-out re-enables only
//! the processes a new instance needs to boot, pass health checks and join
//! the load balancer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A control-plane process that can be suspended or resumed per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalingProcess {
    Launch,
    Terminate,
    HealthCheck,
    ReplaceUnhealthy,
    #[serde(rename = "AZRebalance")]
    AzRebalance,
    AlarmNotification,
    ScheduledActions,
    AddToLoadBalancer,
    InstanceRefresh,
}

/// Processes resumed right after scale-out; everything else stays
/// suspended until the rollout is committed.
pub const SCALE_OUT_PROCESSES: [ScalingProcess; 4] = [
    ScalingProcess::Launch,
    ScalingProcess::Terminate,
    ScalingProcess::HealthCheck,
    ScalingProcess::AddToLoadBalancer,
];

impl ScalingProcess {
    /// Every process the control plane knows about.
    pub const ALL: [ScalingProcess; 9] = [
        ScalingProcess::Launch,
        ScalingProcess::Terminate,
        ScalingProcess::HealthCheck,
        ScalingProcess::ReplaceUnhealthy,
        ScalingProcess::AzRebalance,
        ScalingProcess::AlarmNotification,
        ScalingProcess::ScheduledActions,
        ScalingProcess::AddToLoadBalancer,
        ScalingProcess::InstanceRefresh,
    ];

    /// The control-plane name of the process.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Launch => "Launch",
            Self::Terminate => "Terminate",
            Self::HealthCheck => "HealthCheck",
            Self::ReplaceUnhealthy => "ReplaceUnhealthy",
            Self::AzRebalance => "AZRebalance",
            Self::AlarmNotification => "AlarmNotification",
            Self::ScheduledActions => "ScheduledActions",
            Self::AddToLoadBalancer => "AddToLoadBalancer",
            Self::InstanceRefresh => "InstanceRefresh",
        }
    }
}

impl fmt::Display for ScalingProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_out_resumes_exactly_four_processes() {
        let names: Vec<&str> = SCALE_OUT_PROCESSES.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, ["Launch", "Terminate", "HealthCheck", "AddToLoadBalancer"]);
    }

    #[test]
    fn scheduled_actions_stay_suspended_during_scale_out() {
        assert!(!SCALE_OUT_PROCESSES.contains(&ScalingProcess::ScheduledActions));
        assert!(!SCALE_OUT_PROCESSES.contains(&ScalingProcess::AzRebalance));
    }

    #[test]
    fn serializes_with_control_plane_names() {
        let json = serde_json::to_string(&ScalingProcess::AzRebalance).unwrap();
        assert_eq!(json, "\"AZRebalance\"");
        for process in ScalingProcess::ALL {
            let json = serde_json::to_string(&process).unwrap();
            assert_eq!(json, format!("\"{process}\""));
        }
    }
}
