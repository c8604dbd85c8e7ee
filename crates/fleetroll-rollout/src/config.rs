//! deploy.toml configuration — which group to roll and how long to wait.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RolloutError, RolloutResult};

/// What the driver does when the new generation never becomes healthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutAction {
    /// Terminate the new generation. Default.
    #[default]
    Rollback,
    /// Leave the group scaled out and suspended for an operator.
    Abandon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    pub group: GroupConfig,
    #[serde(default)]
    pub wait: WaitConfig,
    pub simulation: Option<SimulationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
}

/// Poll-loop settings, durations as strings ("500ms", "5s", "10m").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitConfig {
    pub poll_interval: String,
    pub timeout: String,
    #[serde(default)]
    pub on_timeout: TimeoutAction,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval: "10s".to_string(),
            timeout: "10m".to_string(),
            on_timeout: TimeoutAction::Rollback,
        }
    }
}

/// Seed for an in-memory group used by `fleetroll simulate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Launch version the existing instances run.
    pub current_version: String,
    /// Launch version being rolled out.
    pub target_version: String,
    pub min_size: u32,
    pub max_size: u32,
    pub desired_capacity: u32,
    /// How often a pending instance advances to InService.
    #[serde(default = "default_boot_interval")]
    pub boot_interval: String,
    /// New instances never become healthy; exercises the timeout path.
    #[serde(default)]
    pub stall_boot: bool,
}

fn default_boot_interval() -> String {
    "1s".to_string()
}

/// Resolved poll-loop policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloutPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub on_timeout: TimeoutAction,
}

impl Default for RolloutPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            timeout: Duration::from_secs(600),
            on_timeout: TimeoutAction::Rollback,
        }
    }
}

impl DeployConfig {
    pub fn from_file(path: &Path) -> RolloutResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RolloutError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> RolloutResult<Self> {
        toml::from_str(content).map_err(|e| RolloutError::Config(e.to_string()))
    }

    /// Resolve the `[wait]` section into a policy.
    pub fn policy(&self) -> RolloutResult<RolloutPolicy> {
        let poll_interval = required_duration("wait.poll_interval", &self.wait.poll_interval)?;
        let timeout = required_duration("wait.timeout", &self.wait.timeout)?;
        if poll_interval.is_zero() {
            return Err(RolloutError::Config(
                "wait.poll_interval must be greater than zero".to_string(),
            ));
        }
        Ok(RolloutPolicy {
            poll_interval,
            timeout,
            on_timeout: self.wait.on_timeout,
        })
    }
}

impl SimulationConfig {
    pub fn boot_interval(&self) -> RolloutResult<Duration> {
        required_duration("simulation.boot_interval", &self.boot_interval)
    }
}

fn required_duration(field: &str, value: &str) -> RolloutResult<Duration> {
    parse_duration(value)
        .ok_or_else(|| RolloutError::Config(format!("{field}: invalid duration {value:?}")))
}

/// Parse a duration string like "500ms", "30s", "5m" or a bare number of
/// seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
