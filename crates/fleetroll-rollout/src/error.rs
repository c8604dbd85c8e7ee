//! Rollout error types.

use thiserror::Error;

/// Failures reported by a [`FleetControlPort`](crate::port::FleetControlPort).
///
/// The controller never retries or rewrites these; they reach the caller
/// exactly as the port produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("control plane transport failure: {0}")]
    Transport(String),

    #[error("control plane throttled the request: {0}")]
    Throttled(String),

    #[error("control plane rejected credentials: {0}")]
    Unauthorized(String),

    #[error("group not found: {0}")]
    GroupNotFound(String),
}

/// Errors that can occur while driving a rollout.
#[derive(Debug, Error)]
pub enum RolloutError {
    #[error(transparent)]
    Port(#[from] PortError),

    #[error("invalid group snapshot: {0}")]
    State(#[from] fleetroll_state::StateError),

    #[error("invalid deploy config: {0}")]
    Config(String),
}

pub type RolloutResult<T> = Result<T, RolloutError>;
