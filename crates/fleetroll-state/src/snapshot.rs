//! Snapshot files — JSON-serialized `GroupState` on disk.
//!
//! The control plane is the authority on group state; snapshot files are
//! only a convenient way to hand a captured view to the CLI or to tests.

use std::path::Path;

use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::types::GroupState;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Parse a snapshot from a JSON string.
pub fn from_json(json: &str) -> StateResult<GroupState> {
    serde_json::from_str(json).map_err(map_err!(Parse))
}

/// Render a snapshot as pretty-printed JSON.
pub fn to_json(group: &GroupState) -> StateResult<String> {
    serde_json::to_string_pretty(group).map_err(map_err!(Serialize))
}

/// Load a snapshot file.
pub fn load(path: &Path) -> StateResult<GroupState> {
    let content = std::fs::read_to_string(path).map_err(map_err!(Io))?;
    let group = from_json(&content)?;
    debug!(
        ?path,
        group = %group.name,
        instances = group.instances.len(),
        "snapshot loaded"
    );
    Ok(group)
}

/// Write a snapshot file, replacing any existing content.
pub fn save(path: &Path, group: &GroupState) -> StateResult<()> {
    let json = to_json(group)?;
    std::fs::write(path, json).map_err(map_err!(Io))?;
    debug!(?path, group = %group.name, "snapshot saved");
    Ok(())
}
