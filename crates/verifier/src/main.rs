//! STM Index Verifier
//!
//! Background worker for scheduled indexing upkeep:
//! 1. Periodic Scholar verification sweeps over stale and unverified papers
//! 2. Periodic per-journal indexing reports

mod scheduler;

use crate::scheduler::Scheduler;
use std::sync::Arc;
use stmindex_common::{
    config::AppConfig,
    db::{DbPool, Repository},
    metrics,
    notify::TracingNotifier,
    scholar::ScholarVerifier,
    VERSION,
};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .json()
        .init();

    info!("Starting STM Index Verifier v{}", VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    metrics::register_metrics();

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;
    let repo = Repository::new(db);

    let scheduler = Scheduler::new(
        repo,
        ScholarVerifier::new(config.scholar.clone())?,
        Arc::new(TracingNotifier),
        config.scheduler.clone(),
    );

    // One-shot mode for operations: run a single sweep and exit
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "sweep" {
        info!("Running a single verification sweep...");
        let verified = scheduler.run_verification_sweep().await?;
        info!(verified, "Sweep complete");
        return Ok(());
    }

    info!(
        verify_interval_secs = config.scheduler.verify_interval_secs,
        report_interval_secs = config.scheduler.report_interval_secs,
        "Verifier ready, starting scheduled loops"
    );

    scheduler.run().await;

    info!("Verifier shutdown complete");
    Ok(())
}
