//! # Auditflow Replay
//!
//! Drains the dead-letter queue once, replaying every message onto the main
//! queue with the configured delay. Intended to be cron-run.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use auditflow_core::extraction::DeadLetterReplayer;
use auditflow_core::logging::init_logging;
use auditflow_core::messaging::ExtractionQueues;
use auditflow_core::AuditflowConfig;

#[derive(Parser)]
#[command(name = "auditflow-replay")]
#[command(about = "Replay dead-lettered extraction messages onto the main queue")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    Cli::parse();

    let config = AuditflowConfig::from_env().context("loading configuration")?;

    let queues = Arc::new(
        ExtractionQueues::connect(&config.queues)
            .await
            .context("connecting to queues")?,
    );
    queues.ensure_queues().await.context("creating queues")?;

    let replayer = DeadLetterReplayer::new(queues, config.queues.replay_delay_seconds);
    let summary = replayer.drain().await?;

    info!(replayed = summary.replayed, "Replay run complete");
    Ok(())
}
