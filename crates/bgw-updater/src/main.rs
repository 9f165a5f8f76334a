//! BGW metadata cache updater - entry point

use std::process;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use bgw_common::format_duration;
use bgw_common::logging::{init_logging, LogConfig, LogLevel};
use bgw_updater::{
    default_catalog, filtered_catalog, reset, DocumentStore, FieldFilter, MongoStore,
    Scheduler, SparqlClient, UpdateContext, DEFAULT_BATCH_SIZE,
};
use clap::Parser;
use tracing::{error, info, warn};

const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017/";

#[derive(Parser, Debug)]
#[command(name = "bgw-update")]
#[command(about = "Update the BioGateway metadata cache with new data from the SPARQL endpoint")]
struct Cli {
    /// Hostname of the BioGateway SPARQL endpoint to load from
    hostname: String,

    /// Port of the BioGateway SPARQL endpoint to load from
    port: String,

    /// The MongoDB database to store the cached data
    #[arg(value_name = "db-name")]
    db_name: String,

    /// Limit the update to this data type
    #[arg(long)]
    datatype: Option<String>,

    /// Limit the update to this field type
    #[arg(long, value_enum)]
    field: Option<FieldFilter>,

    /// Batch the queries to N entries of each data type
    #[arg(
        long = "batchsize",
        default_value_t = DEFAULT_BATCH_SIZE,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    batch_size: u64,

    /// Hard row limit for unbatched jobs
    #[arg(long)]
    limit: Option<u64>,

    /// Drop all data from the database before updating
    #[arg(long)]
    drop: bool,

    /// Wipe all data from the collections being updated
    #[arg(long)]
    wipe: bool,

    /// Run in parallel. This might cause instabilities
    #[arg(long)]
    parallel: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("bgw-update".to_string())
        .build();
    let log_config = LogConfig::from_env().unwrap_or(log_config);
    let _ = init_logging(&log_config);

    if let Err(e) = run(cli).await {
        error!(error = %e, "Update failed");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let started = Instant::now();
    dotenvy::dotenv().ok();

    let base_url = format!("{}:{}", cli.hostname, cli.port);

    info!("------------------- METADATABASE UPDATER -------------------");
    info!("Updater tool for downloading and caching the BioGateway metadatabase");
    info!("Connecting to endpoint on: {base_url}");
    info!("Updating database:         {}", cli.db_name);
    info!("Parallel:                  {}", cli.parallel);
    info!("-------------------------------------------------------------");

    let catalog = filtered_catalog(default_catalog(), cli.datatype.as_deref(), cli.field);
    if catalog.is_empty() {
        warn!("No data types match the requested filters; nothing to update");
        return Ok(());
    }

    info!("Updating:");
    for data_type in &catalog {
        info!("  {:?}", data_type);
    }

    let mongo_uri =
        std::env::var("MONGODB_URI").unwrap_or_else(|_| DEFAULT_MONGODB_URI.to_string());
    let mongo = mongodb::Client::with_uri_str(&mongo_uri)
        .await
        .context("failed to connect to the document store")?;

    if cli.drop {
        info!("Dropping database {} and rebuilding indexes", cli.db_name);
        reset::drop_and_reset(&mongo, &cli.db_name)
            .await
            .context("database reset failed")?;
        info!("Database {} has been reset", cli.db_name);
    }

    let context = UpdateContext::new(base_url, cli.db_name.clone())
        .with_wipe(cli.wipe)
        .with_limit(cli.limit)
        .with_batch_size(cli.batch_size)
        .with_parallel(cli.parallel);

    let client = SparqlClient::new(context.base_url.clone())
        .context("failed to build the endpoint client")?;
    let store: Arc<dyn DocumentStore> =
        Arc::new(MongoStore::new(mongo.database(&context.db_name)));

    let scheduler = Scheduler::new(client, store, context);
    let report = scheduler.run(&catalog).await?;

    if !report.is_success() {
        for failure in &report.failures {
            error!("{failure}");
        }
        anyhow::bail!(
            "{} of {} update jobs failed",
            report.failures.len(),
            report.failures.len() + report.completed.len()
        );
    }

    info!(
        "All updates completed in: {} ({} rows)",
        format_duration(started.elapsed()),
        report.total_rows()
    );
    Ok(())
}
