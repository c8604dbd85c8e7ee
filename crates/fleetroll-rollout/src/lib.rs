//! fleetroll rolling deployments — scale out, commit, rollback.
//!
//! This crate provides the deployment state machine for replacing every
//! instance of an elastic group with instances of a new launch version.
//! The group is doubled so the new generation boots next to the old one;
//! the rollout then either commits (old generation terminated, automation
//! restored) or rolls back (new generation terminated, automation left
//! suspended).
//!
//! # Components
//!
//! - **`port`** — `FleetControlPort`, the control-plane capability
//! - **`process`** — group automation processes and the scale-out policy
//! - **`controller`** — `DeploymentController` (scale-out, commit, rollback, accounting)
//! - **`driver`** — `RolloutDriver`, the poll loop between scale-out and commit
//! - **`config`** — deploy.toml parsing
//! - **`memory`** — `InMemoryFleet`, a local control plane

pub mod config;
pub mod controller;
pub mod driver;
pub mod error;
pub mod memory;
pub mod port;
pub mod process;

pub use config::{DeployConfig, RolloutPolicy, TimeoutAction};
pub use controller::{DeploymentController, RolloutPhase};
pub use driver::{RolloutDriver, RolloutOutcome, RolloutReport};
pub use error::{PortError, RolloutError, RolloutResult};
pub use memory::{FleetCall, InMemoryFleet};
pub use port::FleetControlPort;
pub use process::{SCALE_OUT_PROCESSES, ScalingProcess};
