//! Monitoring daemon: owns the schema and drives the periodic probe runs.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use hostpulse::config::Config;
use hostpulse::{LibsqlRegistry, LibsqlStore, PingProber, Scheduler};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "hostpulse-service", version, about = "Reachability monitoring daemon")]
struct Cli {
    /// Path to the config file (defaults to the XDG config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single probe run and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init_tracing();

    let cli = Cli::parse();
    let config = Config::from_config(cli.config.as_deref()).context("failed to load config")?;
    info!("{config}");

    let pool = hostpulse::pool::connect(&config.database.path)
        .await
        .with_context(|| format!("failed to open database at {}", config.database.path))?;
    hostpulse::store::initialize(&pool).await.context("failed to run migrations")?;

    let scheduler = Arc::new(Scheduler::new(
        Arc::new(PingProber::new(config.probe_config())),
        Arc::new(LibsqlStore::new(pool.clone())),
        Arc::new(LibsqlRegistry::new(pool)),
        config.scheduler_config(),
    ));

    if cli.once {
        let summary = scheduler.run_once().await?;
        info!(
            hosts = summary.hosts,
            recorded = summary.recorded,
            failed = summary.failed_probes,
            "single probe run complete"
        );
        return Ok(());
    }

    let handle = Arc::clone(&scheduler).start();
    info!("scheduler started (period {}s)", config.scheduler.period_secs);

    tokio::signal::ctrl_c().await.context("failed to listen for shutdown signal")?;

    // In-flight probes are abandoned; any probe without a record yet simply
    // never persists one.
    info!("shutdown signal received");
    handle.abort();

    Ok(())
}
