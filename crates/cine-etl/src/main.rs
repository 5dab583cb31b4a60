//! Cinesearch ETL - keeps the search indexes in sync with the film catalog

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use cine_common::logging::{init_logging, LogConfig, LogLevel};
use cine_etl::config::EtlConfig;
use cine_etl::etl::Scheduler;
use cine_etl::search::SearchClient;
use cine_etl::state::{RedisStorage, SyncState};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cine-etl")]
#[command(author, version, about = "Incremental catalog-to-search sync service")]
struct Cli {
    /// Run a single sync cycle and exit
    #[arg(long)]
    once: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env()?;
    log_config.log_file_prefix = "cine-etl".to_string();
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }
    init_logging(&log_config)?;

    let config = EtlConfig::load()?;

    info!("Connecting to the relational store");
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .connect(&config.database.url)
        .await
        .context("Failed to connect to the relational store")?;

    let search = SearchClient::new(&config.search)?;
    let storage = RedisStorage::new(&config.state.url)
        .context("Failed to set up the state backend")?;
    let state = SyncState::new(Arc::new(storage));

    let scheduler = Scheduler::new(config, pool, search, state);

    if cli.once {
        scheduler.run_cycle().await;
        info!("Single sync cycle complete");
    } else {
        scheduler.run_forever().await;
    }

    Ok(())
}
