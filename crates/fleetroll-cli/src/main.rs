use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "fleetroll",
    about = "fleetroll — rolling deployments for elastic instance groups",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a group snapshot: capacity, serving count, lifecycle states
    Inspect {
        /// Path to a JSON group snapshot
        #[arg(short, long)]
        snapshot: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Show which instances commit and rollback would terminate.
    ///
    /// Nothing is sent to the control plane.
    Plan {
        /// Path to a JSON group snapshot
        #[arg(short, long)]
        snapshot: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Run a full rollout against an in-memory fleet seeded from the
    /// [simulation] section of a deploy config
    Simulate {
        /// Path to deploy.toml
        #[arg(short, long, default_value = "deploy.toml")]
        config: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fleetroll=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { snapshot, format } => {
            commands::inspect::inspect(&snapshot, &format)
        }
        Commands::Plan { snapshot, format } => {
            commands::plan::plan(&snapshot, &format)
        }
        Commands::Simulate { config, format } => {
            commands::simulate::simulate(&config, &format).await
        }
    }
}
