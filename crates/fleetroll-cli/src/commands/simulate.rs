//! `fleetroll simulate` — run a full rollout against an in-memory fleet.
//!
//! The `[simulation]` section of deploy.toml seeds a group running
//! `current_version`; the rollout then replaces it with `target_version`
//! while a background task boots pending instances every
//! `boot_interval`.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use fleetroll_rollout::config::SimulationConfig;
use fleetroll_rollout::{DeployConfig, InMemoryFleet, RolloutDriver, RolloutReport};
use fleetroll_state::{GroupState, InstanceRecord, LifecycleState};

fn seed_group(name: &str, sim: &SimulationConfig) -> GroupState {
    GroupState {
        name: name.to_string(),
        launch_version: sim.current_version.clone(),
        min_size: sim.min_size,
        max_size: sim.max_size,
        desired_capacity: sim.desired_capacity,
        instances: (0..sim.desired_capacity)
            .map(|i| InstanceRecord {
                instance_id: format!("i-seed-{i:04}"),
                launch_version: sim.current_version.clone(),
                lifecycle_state: LifecycleState::InService,
            })
            .collect(),
    }
}

fn render_text(report: &RolloutReport) -> String {
    format!(
        "rollout of {} to {}: {:?}\n  capacity: {}\n  serving at decision: {}\n  terminated: {}\n  polls: {} ({} ms)\n",
        report.group,
        report.launch_version,
        report.outcome,
        report.bounds,
        report.serving,
        report.terminated.len(),
        report.polls,
        report.elapsed_ms,
    )
}

/// Run the simulation described by `config`.
pub async fn run_simulation(config: &DeployConfig) -> Result<RolloutReport> {
    let policy = config.policy()?;
    let sim = config
        .simulation
        .as_ref()
        .context("deploy config has no [simulation] section")?;
    let name = config.group.name.as_str();
    let boot_interval = sim.boot_interval()?;

    let fleet = Arc::new(InMemoryFleet::new().with_group(seed_group(name, sim)));
    fleet.set_launch_version(name, &sim.target_version)?;
    fleet.set_stall_boot(name, sim.stall_boot)?;
    info!(
        group = name,
        from = %sim.current_version,
        to = %sim.target_version,
        "simulated fleet seeded"
    );

    let ticker = {
        let fleet = Arc::clone(&fleet);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(boot_interval).await;
                fleet.tick();
            }
        })
    };

    let result = RolloutDriver::new(&*fleet, policy).run(name).await;
    ticker.abort();
    Ok(result?)
}

pub async fn simulate(path: &str, format: &str) -> Result<()> {
    let config = DeployConfig::from_file(Path::new(path))?;
    let report = run_simulation(&config).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{}", render_text(&report)),
    }

    Ok(())
}
