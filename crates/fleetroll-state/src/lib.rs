//! fleetroll-state — elastic group snapshots.
//!
//! Value objects describing an elastic instance group as the control plane
//! reports it: capacity bounds, the target launch version, and the
//! instances attached to the group with their lifecycle state.
//!
//! # Generations
//!
//! An instance whose `launch_version` equals the group's `launch_version`
//! belongs to the new generation; every other instance is old generation.
//! A rolling deployment retires one of the two generations.
//!
//! Snapshots are immutable values. Nothing in this crate talks to the
//! control plane; fresh snapshots are obtained through the rollout crate's
//! `FleetControlPort`.

pub mod error;
pub mod snapshot;
pub mod types;

pub use error::{StateError, StateResult};
pub use types::*;
