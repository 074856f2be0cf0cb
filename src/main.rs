use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use netmap_studio::api::TopologyApiClient;
use netmap_studio::config::{DashboardSettings, TopologyView};
use netmap_studio::server::run_demo_server;
use netmap_studio::studio::run_studio;

#[derive(Debug, Parser)]
#[command(name = "netmap_studio", about = "Native network topology dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Launch the dashboard UI.
    Studio,
    /// Fetch one topology snapshot and print it as JSON.
    Snapshot {
        /// Topology view: overview, full, or group.
        #[arg(long)]
        view: Option<String>,
        /// Group id for the group view.
        #[arg(long)]
        group_id: Option<u64>,
    },
    /// Serve a seeded demo topology API for development.
    ServeDemo {
        #[arg(long, default_value = "127.0.0.1:8000")]
        bind: String,
        /// YAML seed file; the built-in topology is used when omitted.
        #[arg(long)]
        seed: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = init_tracing()?;

    let cli = Cli::parse();
    let settings = DashboardSettings::from_env().context("failed to load configuration")?;

    match cli.command {
        Commands::Studio => run_studio(&settings)?,
        Commands::Snapshot { view, group_id } => {
            run_snapshot(&settings, view.as_deref(), group_id).await?;
        }
        Commands::ServeDemo { bind, seed } => run_demo_server(&bind, seed.as_deref()).await?,
    }

    Ok(())
}

async fn run_snapshot(
    settings: &DashboardSettings,
    view: Option<&str>,
    group_id: Option<u64>,
) -> Result<()> {
    let view = match view {
        Some(raw) => raw.parse::<TopologyView>()?,
        None => settings.default_view,
    };

    let client = TopologyApiClient::new(settings);
    let snapshot = client
        .fetch_topology(view, group_id)
        .await
        .with_context(|| format!("failed to fetch topology snapshot for view `{view}`"))?;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn init_tracing() -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,netmap_studio=debug"));

    // NETMAP_LOG_DIR switches logging to daily-rolled files; the returned
    // guard must stay alive for the process lifetime.
    if let Ok(log_dir) = std::env::var("NETMAP_LOG_DIR")
        && !log_dir.trim().is_empty()
    {
        let appender = tracing_appender::rolling::daily(log_dir, "netmap_studio.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(writer)
            .with_ansi(false)
            .compact()
            .try_init()
            .map_err(|error| {
                anyhow::anyhow!("failed to initialize tracing subscriber: {error}")
            })?;
        return Ok(Some(guard));
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;
    Ok(None)
}
