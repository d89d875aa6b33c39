//! # Fleetd Server
//!
//! Fleet state and task bookkeeping server.
//!
//! ## Overview
//!
//! The binary wires the shared services (state store, task event log,
//! interruption token registry) and runs two HTTP surfaces for the process
//! lifetime:
//!
//! - **Public API** on the base port: fleet/task queries and the task
//!   interruption/resume protocol.
//! - **Gateway** on base+1: the ingest surface for the fleet-adapter
//!   middleware.
//!
//! State persists to PostgreSQL when `DATABASE_URL` is configured, otherwise
//! to an in-memory store.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fleetd_core::{
    FleetRepository, InterruptionTokenRegistry, MemoryRepository,
    PostgresRepository, StateStore, TaskEventLogService,
};
use fleetd_server::infra::config::{Config, ConfigLoad, ConfigLoader};
use fleetd_server::runtime::{DualSurfaceRuntime, RuntimeConfig};
use fleetd_server::{AppState, create_gateway_app, create_public_app, signals};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "fleetd-server")]
#[command(about = "Fleet state and task bookkeeping server with public and gateway surfaces")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Host both surfaces bind to (overrides config)
    #[arg(long, env = "FLEETD_HOST")]
    host: Option<String>,

    /// Base port: public surface binds here, gateway on base+1 (overrides
    /// config)
    #[arg(short, long, env = "FLEETD_BASE_PORT")]
    port: Option<u16>,

    /// Path to fleetd.toml
    #[arg(long, env = "FLEETD_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply the database schema and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Db(DbCommand::Migrate)) = cli.command {
        run_db_migrate(&cli.serve).await?;
        return Ok(());
    }

    run_server(cli.serve).await
}

async fn run_db_migrate(args: &ServeArgs) -> anyhow::Result<()> {
    let config = load_runtime_config(args)?;
    let url = config
        .database
        .url
        .as_deref()
        .context("DATABASE_URL must be set for migrations")?;
    let pg = PostgresRepository::connect(url)
        .await
        .context("failed to connect to PostgreSQL for migration")?;
    pg.initialize_schema()
        .await
        .context("database migration failed")?;
    info!("Database schema applied successfully");
    Ok(())
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Config> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.base_port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration loaded from file");
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    Ok(config)
}

fn wire_app_state(
    config: Arc<Config>,
    repo: Arc<dyn FleetRepository>,
) -> AppState {
    let store = Arc::new(StateStore::new(Arc::clone(&repo)));
    let task_logs = Arc::new(TaskEventLogService::new(repo));
    let interruptions = Arc::new(InterruptionTokenRegistry::new());
    AppState::new(store, task_logs, interruptions, config)
}

async fn connect_repository(
    config: &Config,
) -> anyhow::Result<Arc<dyn FleetRepository>> {
    match &config.database.url {
        Some(url) => {
            let pg = PostgresRepository::connect(url)
                .await
                .context("PostgreSQL connection failed")?;
            pg.initialize_schema()
                .await
                .context("failed to initialize database schema")?;
            info!("Successfully connected to PostgreSQL");
            Ok(Arc::new(pg))
        }
        None => {
            warn!(
                "no DATABASE_URL configured - fleet state will be kept in memory"
            );
            Ok(Arc::new(MemoryRepository::new()))
        }
    }
}

fn resolve_runtime_config(config: &Config) -> anyhow::Result<RuntimeConfig> {
    let host: IpAddr = config.server.host.parse().with_context(|| {
        format!("host {:?} is not a valid IP address", config.server.host)
    })?;
    Ok(RuntimeConfig {
        public_addr: SocketAddr::new(host, config.public_port()),
        gateway_addr: SocketAddr::new(host, config.gateway_port()),
        drain_timeout: config.shutdown.drain_timeout(),
    })
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let config = Arc::new(load_runtime_config(&args)?);

    let repo = connect_repository(&config).await?;
    let state = wire_app_state(Arc::clone(&config), repo);

    let runtime_config = resolve_runtime_config(&config)?;
    info!(
        public = %runtime_config.public_addr,
        gateway = %runtime_config.gateway_addr,
        prefix = %config.server.public_url_prefix,
        "starting fleetd"
    );

    let runtime = DualSurfaceRuntime::start(
        runtime_config,
        create_public_app(state.clone()),
        create_gateway_app(state),
    )
    .await
    .context("failed to start surfaces")?;

    signals::wait_for_shutdown_signal()
        .await
        .context("failed to listen for shutdown signals")?;
    info!("shutdown signal received");

    runtime.stop().await;
    info!("fleetd stopped");
    Ok(())
}
