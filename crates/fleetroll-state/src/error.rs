//! Error types for group snapshots.

use thiserror::Error;

/// Result type alias for snapshot operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur while loading or validating a snapshot.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("group {group}: capacity bounds violate min <= desired <= max (min={min}, desired={desired}, max={max})")]
    InvalidCapacity {
        group: String,
        min: u32,
        desired: u32,
        max: u32,
    },

    #[error("failed to read snapshot: {0}")]
    Io(String),

    #[error("failed to parse snapshot: {0}")]
    Parse(String),

    #[error("failed to serialize snapshot: {0}")]
    Serialize(String),
}
