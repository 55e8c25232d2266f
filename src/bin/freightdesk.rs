//! Runs the freightdesk scheduled jobs against `PostgreSQL`.
//!
//! Usage:
//!
//! ```text
//! freightdesk [--config-dir <dir>] <run | tick-cards | lock-shipments>
//! ```
//!
//! `run` drives the card tick and the shipment lock pass on their configured
//! intervals until Ctrl-C. `tick-cards` and `lock-shipments` perform a single
//! batch and exit. Configuration is read from `freightdesk.toml` in the
//! configuration directory; see [`freightdesk::config`].

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use freightdesk::card::adapters::LogNotifier;
use freightdesk::card::adapters::postgres::PostgresCardRepository;
use freightdesk::card::services::CardService;
use freightdesk::config::{AppConfig, ConfigError};
use freightdesk::jobs::{
    CardTickJob, JobError, JobOutcome, JobRunner, ScheduledJob, ShipmentLockJob,
};
use freightdesk::shipment::adapters::postgres::PostgresShipmentRepository;
use freightdesk::shipment::services::ShipmentService;
use freightdesk::telemetry::{TelemetryError, init_tracing};
use mockable::DefaultClock;
use std::io;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

type PgPool = Pool<ConnectionManager<PgConnection>>;
type Cards = CardTickJob<PostgresCardRepository, LogNotifier, DefaultClock>;
type Shipments = ShipmentLockJob<PostgresShipmentRepository, DefaultClock>;

/// Card escalation and shipment lock scheduler.
#[derive(Debug, Parser)]
#[command(name = "freightdesk", version, about)]
struct Cli {
    /// Directory containing `freightdesk.toml`.
    #[arg(long, default_value = ".", global = true)]
    config_dir: Utf8PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Run every job on its interval until Ctrl-C.
    Run,
    /// Fire due card deadlines once.
    TickCards,
    /// Lock departed shipments once.
    LockShipments,
}

/// Errors that end the process.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to build database pool: {0}")]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Job(#[from] JobError),
    #[error("failed to wait for shutdown signal: {0}")]
    Signal(#[source] io::Error),
    #[error("job task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config_dir)?;
    init_tracing(&config.logging)?;
    info!(config_dir = %cli.config_dir, command = ?cli.command, "freightdesk starting");

    let pool = build_pool(&config)?;
    let (card_job, shipment_job) = build_jobs(&config, &pool)?;

    match cli.command {
        Command::TickCards => log_outcome(&card_job, card_job.run_once().await?),
        Command::LockShipments => log_outcome(&shipment_job, shipment_job.run_once().await?),
        Command::Run => run_until_ctrl_c(&config, card_job, shipment_job).await?,
    }
    Ok(())
}

fn build_pool(config: &AppConfig) -> Result<PgPool, CliError> {
    let manager = ConnectionManager::<PgConnection>::new(config.database.require_url()?);
    Ok(Pool::builder()
        .max_size(config.database.pool_size)
        .build(manager)?)
}

fn build_jobs(config: &AppConfig, pool: &PgPool) -> Result<(Cards, Shipments), CliError> {
    let clock = Arc::new(DefaultClock);
    let cards = CardService::new(
        Arc::new(PostgresCardRepository::new(pool.clone())),
        Arc::new(LogNotifier),
        Arc::clone(&clock),
        config.escalation.policy()?,
    );
    let shipments = ShipmentService::new(
        Arc::new(PostgresShipmentRepository::new(pool.clone())),
        clock,
        config.shipment_lock.policy()?,
    );
    Ok((
        CardTickJob::new(cards, config.jobs.batch_size),
        ShipmentLockJob::new(shipments, config.jobs.batch_size),
    ))
}

fn log_outcome(job: &dyn ScheduledJob, outcome: JobOutcome) {
    info!(job = job.name(), %outcome, "job finished");
}

async fn run_until_ctrl_c(
    config: &AppConfig,
    card_job: Cards,
    shipment_job: Shipments,
) -> Result<(), CliError> {
    let (shutdown, receiver) = watch::channel(false);
    let card_runner = JobRunner::new(receiver.clone());
    let shipment_runner = JobRunner::new(receiver);
    let card_period = config.jobs.card_tick_period();
    let shipment_period = config.jobs.shipment_lock_period();

    let cards = tokio::spawn(async move { card_runner.run(&card_job, card_period).await });
    let shipments =
        tokio::spawn(async move { shipment_runner.run(&shipment_job, shipment_period).await });

    let signal = tokio::signal::ctrl_c().await;
    info!("shutdown requested");
    shutdown.send_replace(true);

    let card_summary = cards.await?;
    let shipment_summary = shipments.await?;
    info!(
        card_runs = card_summary.succeeded,
        card_failures = card_summary.failed,
        shipment_runs = shipment_summary.succeeded,
        shipment_failures = shipment_summary.failed,
        "freightdesk stopped"
    );
    signal.map_err(CliError::Signal)
}
