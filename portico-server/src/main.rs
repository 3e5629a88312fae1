//! # Portico Server
//!
//! Content API for a research group's public site.
//!
//! ## Overview
//!
//! - **Collections**: grants and projects, publications, news, and
//!   collaborators, each served in `homepage`, `list`, `searching`, and
//!   `detail` shapes
//! - **Media**: populated images are narrowed to the rendition that fits the
//!   page they are shown on
//! - **Statistics**: grant and publication aggregates recomputed on every
//!   write and served as stored
//!
//! ## Architecture
//!
//! Built on Axum with PostgreSQL storage (or in-memory stores for local runs).

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use portico_core::database::postgres;
use portico_server::infra::{
    config::{Config, ConfigLoad, ConfigLoader},
    seed::{read_seed_file, seed},
    startup::{build_router, build_state, connect_database, shutdown_signal},
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "portico-server")]
#[command(about = "Content API serving mode-shaped collections and aggregate statistics")]
struct Cli {
    /// Path to a portico.toml configuration file
    #[arg(long, global = true, env = "PORTICO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// Keep content and statistics in process memory instead of PostgreSQL
    #[arg(long, env = "PORTICO_IN_MEMORY", default_value_t = false)]
    in_memory: bool,

    /// JSON file of entries to import before serving
    #[arg(long)]
    seed: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the API (the default)
    Serve,
    #[command(subcommand)]
    Db(DbCommand),
    #[command(subcommand)]
    Stats(StatsCommand),
    /// Import entries from a JSON file into PostgreSQL
    Seed {
        /// `{"<collection>": [entry, ...], ...}`
        file: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[derive(Debug, Subcommand)]
enum StatsCommand {
    /// Recompute every aggregate from the stored content and exit
    Recalculate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,portico_server=debug,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config(cli.config.clone(), &cli.serve)?;

    match cli.command {
        None | Some(Command::Serve) => run_server(config, cli.serve).await,
        Some(Command::Db(DbCommand::Migrate)) => run_db_migrate(&config).await,
        Some(Command::Stats(StatsCommand::Recalculate)) => run_stats_recalculate(config).await,
        Some(Command::Seed { file }) => run_seed(config, file).await,
    }
}

fn load_config(config_path: Option<PathBuf>, args: &ServeArgs) -> anyhow::Result<Arc<Config>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = config_path {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server.host = host;
    }

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    Ok(Arc::new(config))
}

async fn run_server(config: Arc<Config>, args: ServeArgs) -> anyhow::Result<()> {
    let state = build_state(Arc::clone(&config), args.in_memory).await?;

    if let Some(path) = &args.seed {
        let entries = read_seed_file(path)?;
        let report = seed(&state, entries).await.context("seeding failed")?;
        info!(entries = report.total(), "seed data imported");
    }

    let router = build_router(state);
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    info!(
        max_page_size = config.content.max_page_size,
        "Starting Portico server on {}", addr
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn run_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = connect_database(config).await?;
    postgres::migrate(&pool)
        .await
        .context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

async fn run_stats_recalculate(config: Arc<Config>) -> anyhow::Result<()> {
    let state = build_state(config, false).await?;
    for aggregator in state.aggregators() {
        let record = aggregator
            .recalculate()
            .await
            .with_context(|| format!("failed to recalculate {}", aggregator.key()))?;
        info!(key = %record.key, id = record.id, "statistics recalculated");
    }
    Ok(())
}

async fn run_seed(config: Arc<Config>, file: PathBuf) -> anyhow::Result<()> {
    let state = build_state(config, false).await?;
    let entries = read_seed_file(&file)?;
    let report = seed(&state, entries).await.context("seeding failed")?;
    for (collection, count) in &report.created {
        info!(%collection, count, "entries created");
    }
    info!(entries = report.total(), "seed data imported");
    Ok(())
}
