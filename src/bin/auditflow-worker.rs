//! # Auditflow Worker
//!
//! Runs the extraction worker against the main queue, or emits a single
//! scheduled tick (`tick`) for cron to invoke.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use auditflow_core::extraction::{Dispatcher, FanOutScheduler, PageExtractor};
use auditflow_core::logging::init_logging;
use auditflow_core::messaging::ExtractionQueues;
use auditflow_core::storage::FileStore;
use auditflow_core::upstream::AuditApiClient;
use auditflow_core::worker::ExtractionWorker;
use auditflow_core::AuditflowConfig;

#[derive(Parser)]
#[command(name = "auditflow-worker")]
#[command(about = "Queue-driven audit-log extraction worker")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the main-queue poll loop (default)
    Run,
    /// Emit one scheduled trigger to start a new extraction job, then exit
    Tick,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = AuditflowConfig::from_env().context("loading configuration")?;

    let queues = Arc::new(
        ExtractionQueues::connect(&config.queues)
            .await
            .context("connecting to queues")?,
    );
    queues.ensure_queues().await.context("creating queues")?;

    let upstream = Arc::new(AuditApiClient::new(&config.upstream)?);
    let store = Arc::new(FileStore::new(&config.storage));
    let scheduler = FanOutScheduler::new(queues.clone(), upstream.clone());
    let extractor = PageExtractor::new(upstream, store);
    let dispatcher = Dispatcher::new(
        queues.clone(),
        scheduler,
        extractor,
        config.extraction.lookback_days,
    );

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Tick => {
            let outcome = dispatcher.start_job().await?;
            info!(outcome = %outcome, "Tick complete");
            Ok(())
        }
        Commands::Run => {
            let worker = ExtractionWorker::new(queues, dispatcher, &config.queues);
            worker.run().await.map_err(Into::into)
        }
    }
}
