use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::JobStatus;

use super::job_orchestrator::stale_cutoff;

/// Fails `processing` jobs that stopped making progress, e.g. because the
/// request driving them was dropped.
pub struct StaleJobSweeper {
    job_repository: Arc<dyn JobRepository>,
    stale_after: Duration,
    interval: Duration,
}

impl StaleJobSweeper {
    pub fn new(
        job_repository: Arc<dyn JobRepository>,
        stale_after: Duration,
        interval: Duration,
    ) -> Self {
        Self {
            job_repository,
            stale_after,
            interval: interval.max(Duration::from_secs(1)),
        }
    }

    /// Returns how many jobs were expired.
    pub async fn sweep_once(&self) -> Result<usize, RepositoryError> {
        let stale_before = stale_cutoff(Utc::now(), self.stale_after);
        let message = format!(
            "transcription abandoned: no progress within {}s",
            self.stale_after.as_secs()
        );

        let candidates = self
            .job_repository
            .list_by_status(JobStatus::Processing)
            .await?;

        let mut expired = 0;
        for job in candidates.iter().filter(|job| job.is_stale(stale_before)) {
            if let Some(job) = self
                .job_repository
                .expire_if_stale(&job.interview_id, stale_before, &message)
                .await?
            {
                tracing::warn!(
                    interview_id = %job.interview_id,
                    attempts = job.attempts,
                    "Expired stale transcription job"
                );
                expired += 1;
            }
        }

        Ok(expired)
    }

    pub async fn run(self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            stale_after_secs = self.stale_after.as_secs(),
            "Stale job sweeper started"
        );
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            match self.sweep_once().await {
                Ok(0) => {}
                Ok(count) => tracing::info!(count, "Stale job sweep finished"),
                Err(e) => tracing::error!(error = %e, "Stale job sweep failed"),
            }
        }
    }
}
