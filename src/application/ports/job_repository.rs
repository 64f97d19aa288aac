use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{InterviewId, JobStatus, Transcript, TranscriptionJob};

use super::RepositoryError;

/// Result of trying to take ownership of an interview's job.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// The job is now `processing` and owned by the caller.
    Claimed(TranscriptionJob),
    /// Another attempt is running and has not gone stale.
    InFlight(TranscriptionJob),
    AlreadyCompleted(TranscriptionJob),
    /// The stored job points at a different video.
    VideoUrlMismatch(TranscriptionJob),
}

impl ClaimOutcome {
    /// Applies the claim rules to the current record. `Claimed` carries the
    /// record already moved to `processing`; the caller must persist it.
    pub fn resolve(
        mut job: TranscriptionJob,
        video_url: &str,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> Self {
        if job.video_url != video_url {
            return ClaimOutcome::VideoUrlMismatch(job);
        }

        match job.status {
            JobStatus::Completed => ClaimOutcome::AlreadyCompleted(job),
            JobStatus::Processing => match job.reclaim_stale(now, stale_before) {
                Ok(()) => {
                    tracing::warn!(
                        interview_id = %job.interview_id,
                        attempts = job.attempts,
                        "Reclaiming stale transcription job"
                    );
                    ClaimOutcome::Claimed(job)
                }
                Err(_) => ClaimOutcome::InFlight(job),
            },
            JobStatus::Pending | JobStatus::Failed => match job.begin_processing(now) {
                Ok(()) => ClaimOutcome::Claimed(job),
                Err(_) => ClaimOutcome::InFlight(job),
            },
        }
    }

    pub fn job(&self) -> &TranscriptionJob {
        match self {
            ClaimOutcome::Claimed(job)
            | ClaimOutcome::InFlight(job)
            | ClaimOutcome::AlreadyCompleted(job)
            | ClaimOutcome::VideoUrlMismatch(job) => job,
        }
    }
}

/// Terminal outcome written at the end of an attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate {
    Completed(Transcript),
    Failed(String),
}

impl StatusUpdate {
    /// Applies the outcome of attempt `attempt` to `job` in place.
    pub fn apply_to(
        self,
        job: &mut TranscriptionJob,
        attempt: u32,
        now: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        if job.attempts != attempt {
            return Err(RepositoryError::ConstraintViolation(format!(
                "attempt {} of interview {} was superseded by attempt {}",
                attempt, job.interview_id, job.attempts
            )));
        }

        let result = match self {
            StatusUpdate::Completed(transcript) => job.complete(transcript, now),
            StatusUpdate::Failed(message) => job.fail(message, now),
        };
        result.map_err(|e| RepositoryError::ConstraintViolation(e.to_string()))
    }
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Inserts a job as-is, for seeding and importing jobs recorded elsewhere.
    /// Rejects an interview that already has one. The request path creates
    /// jobs through [`JobRepository::claim`] instead.
    async fn create(&self, job: &TranscriptionJob) -> Result<(), RepositoryError>;

    async fn find_by_interview(
        &self,
        interview_id: &InterviewId,
    ) -> Result<Option<TranscriptionJob>, RepositoryError>;

    /// Atomically creates or moves the interview's job into `processing`.
    /// Only one concurrent caller per interview can observe `Claimed`.
    async fn claim(
        &self,
        interview_id: &InterviewId,
        video_url: &str,
        stale_before: DateTime<Utc>,
    ) -> Result<ClaimOutcome, RepositoryError>;

    /// Writes the terminal outcome of attempt number `attempt`. Fails with
    /// `ConstraintViolation` when the job has moved on to another attempt or
    /// the transition is illegal.
    async fn upsert_status(
        &self,
        interview_id: &InterviewId,
        attempt: u32,
        update: StatusUpdate,
    ) -> Result<TranscriptionJob, RepositoryError>;

    /// Fails the job only if it is still `processing` and was last updated
    /// before `stale_before`. Returns the expired job, or `None` if it was not
    /// stale at the time of the write.
    async fn expire_if_stale(
        &self,
        interview_id: &InterviewId,
        stale_before: DateTime<Utc>,
        message: &str,
    ) -> Result<Option<TranscriptionJob>, RepositoryError>;

    async fn list_by_status(
        &self,
        status: JobStatus,
    ) -> Result<Vec<TranscriptionJob>, RepositoryError>;
}
