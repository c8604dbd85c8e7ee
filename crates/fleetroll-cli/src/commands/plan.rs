//! `fleetroll plan` — which instances commit and rollback would terminate.
//!
//! Read-only: no control-plane calls are made.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use fleetroll_state::{CapacityBounds, GroupState, InstanceId, snapshot};

#[derive(Debug, Serialize)]
struct Plan {
    group: String,
    launch_version: String,
    scale_out: CapacityBounds,
    commit_terminates: Vec<InstanceId>,
    rollback_terminates: Vec<InstanceId>,
}

fn build_plan(group: &GroupState) -> Plan {
    Plan {
        group: group.name.clone(),
        launch_version: group.launch_version.clone(),
        scale_out: group.bounds().scaled_out(),
        commit_terminates: group.old_generation(),
        rollback_terminates: group.new_generation(),
    }
}

fn render_text(plan: &Plan) -> String {
    let list = |ids: &[InstanceId]| {
        if ids.is_empty() {
            "(none)".to_string()
        } else {
            ids.join(", ")
        }
    };
    format!(
        "group {} -> launch version {}\n  scale-out: {}\n  commit terminates:   {}\n  rollback terminates: {}\n",
        plan.group,
        plan.launch_version,
        plan.scale_out,
        list(&plan.commit_terminates),
        list(&plan.rollback_terminates),
    )
}

pub fn plan(path: &str, format: &str) -> Result<()> {
    let group = snapshot::load(Path::new(path))?;
    group.validate()?;
    let plan = build_plan(&group);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&plan)?),
        _ => print!("{}", render_text(&plan)),
    }

    Ok(())
}
