//! Scheduled verification sweeps and indexing reports
//!
//! Two timer-driven loops share one task:
//! - the verification sweep re-checks papers that were never confirmed as
//!   indexed, pacing requests so Scholar doesn't rate-limit the worker
//! - the indexing report logs per-journal statistics for operators

use chrono::{Duration as ChronoDuration, Utc};
use std::future::Future;
use std::sync::Arc;
use stmindex_common::{
    config::SchedulerConfig,
    db::models::{DatabaseApplication, DatabaseConfig},
    db::Repository,
    errors::Result,
    notify::Notifier,
    scholar::ScholarVerifier,
};
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};
use tracing::{error, info, warn};

/// A paper is considered stale once unverified for this long
const STALE_AFTER_DAYS: i64 = 7;

pub struct Scheduler {
    repo: Repository,
    scholar: ScholarVerifier,
    notifier: Arc<dyn Notifier>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(
        repo: Repository,
        scholar: ScholarVerifier,
        notifier: Arc<dyn Notifier>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            repo,
            scholar,
            notifier,
            config,
        }
    }

    /// Run both scheduled loops until a shutdown signal arrives
    pub async fn run(&self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await;
    }

    /// Drive both timers until `shutdown` completes. The shutdown future is
    /// pinned once and polled across iterations, so a signal arriving while
    /// a sweep or report is running still stops the loop at the next turn.
    pub async fn run_until(&self, shutdown: impl Future<Output = ()>) {
        let mut verify_timer = interval(Duration::from_secs(self.config.verify_interval_secs));
        verify_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut report_timer = interval(Duration::from_secs(self.config.report_interval_secs));
        report_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Both intervals fire immediately; skip the initial ticks so startup
        // doesn't trigger a full sweep
        verify_timer.tick().await;
        report_timer.tick().await;

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
                _ = verify_timer.tick() => {
                    if let Err(e) = self.run_verification_sweep().await {
                        error!(error = %e, "Verification sweep failed");
                    }
                }
                _ = report_timer.tick() => {
                    if let Err(e) = self.run_indexing_report().await {
                        error!(error = %e, "Indexing report failed");
                    }
                }
            }
        }
    }

    /// Verify a batch of candidate papers, pacing requests between papers.
    /// Returns how many papers were processed.
    pub async fn run_verification_sweep(&self) -> Result<usize> {
        let stale_before = Utc::now() - ChronoDuration::days(STALE_AFTER_DAYS);
        let candidates = self
            .repo
            .verification_candidates(stale_before, self.config.verify_batch_size)
            .await?;

        if candidates.is_empty() {
            info!("Verification sweep: nothing to verify");
            return Ok(0);
        }

        info!(count = candidates.len(), "Verification sweep starting");

        let mut processed = 0;
        for paper in candidates {
            let paper_id = paper.id;
            match self
                .scholar
                .verify(&self.repo, self.notifier.as_ref(), paper)
                .await
            {
                Ok(outcome) => {
                    info!(
                        paper_id = %paper_id,
                        indexed = outcome.is_indexed,
                        "Sweep verification complete"
                    );
                }
                Err(e) => {
                    // Keep sweeping; the paper stays a candidate for next time
                    warn!(paper_id = %paper_id, error = %e, "Sweep verification failed");
                }
            }
            processed += 1;

            sleep(Duration::from_secs(self.config.verify_pause_secs)).await;
        }

        info!(processed, "Verification sweep finished");
        Ok(processed)
    }

    /// Log per-journal indexing statistics across all tenants
    pub async fn run_indexing_report(&self) -> Result<()> {
        let journals = self.repo.all_journals().await?;
        info!(journals = journals.len(), "Indexing report starting");

        for journal in journals {
            let papers = self.repo.papers_for_journal(journal.id).await?;
            let applications: Vec<(DatabaseApplication, DatabaseConfig)> = self
                .repo
                .applications_for_journal(journal.id)
                .await?
                .into_iter()
                .filter_map(|(app, config)| config.map(|c| (app, c)))
                .collect();

            let stats = stmindex_analytics::journal_stats(&papers, &applications);

            info!(
                journal_id = %journal.id,
                journal = %journal.name,
                total_papers = stats.total_papers,
                indexed_papers = stats.indexed_papers,
                indexing_rate = stats.indexing_rate,
                impact_factor_estimate = stats.impact_factor_estimate,
                "Journal indexing report"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use stmindex_common::{
        config::ScholarConfig,
        db::{models::Paper, DbPool},
        notify::TracingNotifier,
    };
    use tokio::time::timeout;

    fn scheduler(conn: sea_orm::DatabaseConnection) -> Scheduler {
        Scheduler::new(
            Repository::new(DbPool {
                primary: conn,
                replica: None,
            }),
            ScholarVerifier::new(ScholarConfig {
                base_url: "https://scholar.google.com/scholar".to_string(),
                timeout_secs: 5,
            })
            .unwrap(),
            Arc::new(TracingNotifier),
            SchedulerConfig {
                verify_interval_secs: 1,
                report_interval_secs: 3600,
                verify_batch_size: 10,
                verify_pause_secs: 1,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_latched_across_sweeps() {
        // Empty candidate batches for each sweep the loop gets through
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                Vec::<Paper>::new(),
                Vec::<Paper>::new(),
                Vec::<Paper>::new(),
                Vec::<Paper>::new(),
            ])
            .into_connection();

        let scheduler = scheduler(conn);

        // Shutdown fires between the second and third sweep ticks. The loop
        // must observe it even though the future was already pending while
        // sweeps ran; a hung loop trips the outer timeout.
        timeout(
            Duration::from_secs(60),
            scheduler.run_until(async {
                tokio::time::sleep(Duration::from_millis(2500)).await;
            }),
        )
        .await
        .expect("scheduler did not stop on shutdown");
    }
}
