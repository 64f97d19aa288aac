use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::application::ports::{ClaimOutcome, JobRepository, RepositoryError, StatusUpdate};
use crate::domain::{InterviewId, JobStatus, TranscriptionJob};

/// Process-local job store. Every mutation runs inside one write section,
/// which is what makes `claim` a compare-and-set.
#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<HashMap<InterviewId, TranscriptionJob>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: &TranscriptionJob) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.interview_id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "job for interview {} already exists",
                job.interview_id
            )));
        }
        jobs.insert(job.interview_id.clone(), job.clone());
        Ok(())
    }

    async fn find_by_interview(
        &self,
        interview_id: &InterviewId,
    ) -> Result<Option<TranscriptionJob>, RepositoryError> {
        Ok(self.jobs.read().await.get(interview_id).cloned())
    }

    async fn claim(
        &self,
        interview_id: &InterviewId,
        video_url: &str,
        stale_before: DateTime<Utc>,
    ) -> Result<ClaimOutcome, RepositoryError> {
        let mut jobs = self.jobs.write().await;
        let current = jobs
            .get(interview_id)
            .cloned()
            .unwrap_or_else(|| TranscriptionJob::new(interview_id.clone(), video_url));

        let outcome = ClaimOutcome::resolve(current, video_url, Utc::now(), stale_before);
        if let ClaimOutcome::Claimed(job) = &outcome {
            jobs.insert(interview_id.clone(), job.clone());
        }
        Ok(outcome)
    }

    async fn upsert_status(
        &self,
        interview_id: &InterviewId,
        attempt: u32,
        update: StatusUpdate,
    ) -> Result<TranscriptionJob, RepositoryError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(interview_id)
            .ok_or_else(|| RepositoryError::NotFound(interview_id.to_string()))?;

        let mut next = job.clone();
        update.apply_to(&mut next, attempt, Utc::now())?;
        *job = next.clone();
        Ok(next)
    }

    async fn expire_if_stale(
        &self,
        interview_id: &InterviewId,
        stale_before: DateTime<Utc>,
        message: &str,
    ) -> Result<Option<TranscriptionJob>, RepositoryError> {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(interview_id) else {
            return Ok(None);
        };
        if !job.is_stale(stale_before) {
            return Ok(None);
        }

        job.fail(message, Utc::now())
            .map_err(|e| RepositoryError::ConstraintViolation(e.to_string()))?;
        Ok(Some(job.clone()))
    }

    async fn list_by_status(
        &self,
        status: JobStatus,
    ) -> Result<Vec<TranscriptionJob>, RepositoryError> {
        let jobs = self.jobs.read().await;
        let mut matching: Vec<TranscriptionJob> = jobs
            .values()
            .filter(|job| job.status == status)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }
}
