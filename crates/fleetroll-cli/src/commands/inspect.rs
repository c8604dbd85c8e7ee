//! `fleetroll inspect` — capacity and lifecycle summary of a snapshot.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use fleetroll_state::{CapacityBounds, GroupState, snapshot};

#[derive(Debug, Serialize)]
struct Summary<'a> {
    group: &'a str,
    launch_version: &'a str,
    bounds: CapacityBounds,
    consistent: bool,
    serving: usize,
    old_generation: usize,
    new_generation: usize,
    states: BTreeMap<String, usize>,
}

fn summarize(group: &GroupState) -> Summary<'_> {
    let mut states = BTreeMap::new();
    for instance in &group.instances {
        *states
            .entry(instance.lifecycle_state.to_string())
            .or_insert(0) += 1;
    }
    Summary {
        group: &group.name,
        launch_version: &group.launch_version,
        bounds: group.bounds(),
        consistent: group.validate().is_ok(),
        serving: group.serving_count(),
        old_generation: group.old_generation().len(),
        new_generation: group.new_generation().len(),
        states,
    }
}

fn render_text(summary: &Summary<'_>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "group {} (launch version {})\n",
        summary.group, summary.launch_version
    ));
    out.push_str(&format!("  capacity: {}", summary.bounds));
    if !summary.consistent {
        out.push_str("  [INCONSISTENT]");
    }
    out.push('\n');
    out.push_str(&format!("  serving:  {}\n", summary.serving));
    out.push_str(&format!(
        "  generations: {} new, {} old\n",
        summary.new_generation, summary.old_generation
    ));
    for (state, count) in &summary.states {
        out.push_str(&format!("    {state:<20} {count}\n"));
    }
    out
}

pub fn inspect(path: &str, format: &str) -> Result<()> {
    let group = snapshot::load(Path::new(path))?;
    let summary = summarize(&group);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => print!("{}", render_text(&summary)),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetroll_state::{InstanceRecord, LifecycleState};

    fn test_group() -> GroupState {
        let instance = |id: &str, version: &str, state: &str| InstanceRecord {
            instance_id: id.to_string(),
            launch_version: version.to_string(),
            lifecycle_state: LifecycleState::from(state),
        };
        GroupState {
            name: "web".to_string(),
            launch_version: "web-lc-2".to_string(),
            min_size: 2,
            max_size: 4,
            desired_capacity: 4,
            instances: vec![
                instance("i-1", "web-lc-1", "InService"),
                instance("i-2", "web-lc-1", "InService"),
                instance("i-3", "web-lc-2", "Pending"),
                instance("i-4", "web-lc-2", "Rebooting"),
            ],
        }
    }

    #[test]
    fn summary_counts_states_and_generations() {
        let group = test_group();
        let summary = summarize(&group);

        assert_eq!(summary.serving, 2);
        assert_eq!(summary.old_generation, 2);
        assert_eq!(summary.new_generation, 2);
        assert_eq!(summary.states.get("InService"), Some(&2));
        assert_eq!(summary.states.get("Rebooting"), Some(&1));
        assert!(summary.consistent);
    }

    #[test]
    fn text_flags_inconsistent_bounds() {
        let mut group = test_group();
        group.desired_capacity = 10;

        let text = render_text(&summarize(&group));
        assert!(text.contains("[INCONSISTENT]"));
        assert!(text.contains("min=2 max=4 desired=10"));
    }

    #[test]
    fn inspect_reads_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web.json");
        snapshot::save(&path, &test_group()).unwrap();

        inspect(path.to_str().unwrap(), "json").unwrap();
    }
}
