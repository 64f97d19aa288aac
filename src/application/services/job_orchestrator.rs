use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::timeout;
use tracing::Instrument;

use crate::application::ports::{
    ClaimOutcome, FetchError, JobRepository, MediaFetcher, RepositoryError, StatusUpdate,
    TranscriptionEngine, TranscriptionError,
};
use crate::domain::{InterviewId, JobStatus, Transcript, TranscriptMetadata, TranscriptionJob};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub fetch_timeout: Duration,
    pub transcribe_timeout: Duration,
    /// A `processing` job with no update for this long may be taken over.
    pub stale_after: Duration,
}

/// A job is only reclaimable once every step it may still be running has
/// timed out, otherwise a live attempt and its replacement both call the engine.
#[derive(Debug, thiserror::Error)]
#[error(
    "stale_after ({stale_after:?}) must exceed fetch_timeout + transcribe_timeout ({pipeline_budget:?})"
)]
pub struct StaleThresholdTooShort {
    pub stale_after: Duration,
    pub pipeline_budget: Duration,
}

impl OrchestratorConfig {
    pub fn new(
        fetch_timeout: Duration,
        transcribe_timeout: Duration,
        stale_after: Duration,
    ) -> Result<Self, StaleThresholdTooShort> {
        let pipeline_budget = fetch_timeout.saturating_add(transcribe_timeout);
        if stale_after <= pipeline_budget {
            return Err(StaleThresholdTooShort {
                stale_after,
                pipeline_budget,
            });
        }
        Ok(Self {
            fetch_timeout,
            transcribe_timeout,
            stale_after,
        })
    }

    pub fn stale_before(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        stale_cutoff(now, self.stale_after)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(120),
            transcribe_timeout: Duration::from_secs(600),
            stale_after: Duration::from_secs(900),
        }
    }
}

/// Latest instant a `processing` job may have been touched and still count as stale.
pub(crate) fn stale_cutoff(now: DateTime<Utc>, stale_after: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(stale_after)
        .ok()
        .and_then(|age| now.checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Caller-facing view of a job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub interview_id: InterviewId,
    pub status: JobStatus,
    pub transcription: Option<String>,
    pub metadata: Option<TranscriptMetadata>,
    pub error: Option<String>,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobReport {
    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Completed
    }
}

impl From<TranscriptionJob> for JobReport {
    fn from(job: TranscriptionJob) -> Self {
        Self {
            interview_id: job.interview_id,
            status: job.status,
            transcription: job.transcript_text,
            metadata: job.metadata,
            error: job.error_message,
            attempts: job.attempts,
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("no transcription job for interview {0}")]
    NotFound(InterviewId),
    #[error("transcription already in progress for interview {}", .0.interview_id)]
    AlreadyProcessing(Box<JobReport>),
    #[error("persistence: {0}")]
    Persistence(#[from] RepositoryError),
}

/// Why a single fetch + transcribe attempt did not produce a transcript.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("media fetch failed: {0}")]
    Fetch(FetchError),
    #[error("media fetch timed out after {}s", .0.as_secs())]
    FetchTimeout(Duration),
    #[error("transcription engine failed: {0}")]
    Engine(TranscriptionError),
    #[error("transcription timed out after {}s", .0.as_secs())]
    EngineTimeout(Duration),
}

enum Claim {
    Run(TranscriptionJob),
    Replay(JobReport),
}

/// Drives transcription jobs through `pending -> processing -> completed|failed`.
///
/// Entry into `processing` only happens through [`JobRepository::claim`], so
/// two concurrent starts for the same interview never both reach the engine.
#[derive(Clone)]
pub struct JobOrchestrator {
    job_repository: Arc<dyn JobRepository>,
    media_fetcher: Arc<dyn MediaFetcher>,
    transcription_engine: Arc<dyn TranscriptionEngine>,
    config: OrchestratorConfig,
}

impl JobOrchestrator {
    pub fn new(
        job_repository: Arc<dyn JobRepository>,
        media_fetcher: Arc<dyn MediaFetcher>,
        transcription_engine: Arc<dyn TranscriptionEngine>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            job_repository,
            media_fetcher,
            transcription_engine,
            config,
        }
    }

    /// Runs the job to completion within this call.
    ///
    /// Fetch and engine failures come back as `Ok` with a `failed` report;
    /// `Err` is reserved for rejected requests and persistence failures.
    #[tracing::instrument(skip(self, video_url), fields(interview_id = %job_id))]
    pub async fn start_job(
        &self,
        job_id: &str,
        video_url: &str,
    ) -> Result<JobReport, OrchestratorError> {
        match self.claim(job_id, video_url).await? {
            Claim::Run(job) => self.run_claimed(job).await,
            Claim::Replay(report) => Ok(report),
        }
    }

    /// Claims the job and runs it on a background task, returning the
    /// `processing` report right away.
    #[tracing::instrument(skip(self, video_url), fields(interview_id = %job_id))]
    pub async fn submit_job(
        &self,
        job_id: &str,
        video_url: &str,
    ) -> Result<JobReport, OrchestratorError> {
        let job = match self.claim(job_id, video_url).await? {
            Claim::Run(job) => job,
            Claim::Replay(report) => return Ok(report),
        };

        let report = JobReport::from(job.clone());
        let span = tracing::info_span!("transcription_job", interview_id = %job.interview_id);
        let orchestrator = self.clone();

        tokio::spawn(
            async move {
                if let Err(e) = orchestrator.run_claimed(job).await {
                    tracing::error!(error = %e, "Background transcription job failed");
                }
            }
            .instrument(span),
        );

        Ok(report)
    }

    pub async fn get_status(&self, interview_id: &str) -> Result<JobReport, OrchestratorError> {
        let interview_id = parse_interview_id(interview_id)?;

        self.job_repository
            .find_by_interview(&interview_id)
            .await?
            .map(JobReport::from)
            .ok_or(OrchestratorError::NotFound(interview_id))
    }

    async fn claim(&self, job_id: &str, video_url: &str) -> Result<Claim, OrchestratorError> {
        let interview_id = parse_interview_id(job_id)?;
        let video_url = video_url.trim();
        if video_url.is_empty() {
            return Err(OrchestratorError::InvalidArgument(
                "videoUrl must not be empty".to_string(),
            ));
        }

        let stale_before = self.config.stale_before(Utc::now());
        let outcome = self
            .job_repository
            .claim(&interview_id, video_url, stale_before)
            .await?;

        match outcome {
            ClaimOutcome::Claimed(job) => {
                tracing::info!(attempt = job.attempts, "Transcription job claimed");
                Ok(Claim::Run(job))
            }
            ClaimOutcome::AlreadyCompleted(job) => {
                tracing::info!("Transcription job already completed, returning stored result");
                Ok(Claim::Replay(JobReport::from(job)))
            }
            ClaimOutcome::InFlight(job) => {
                tracing::warn!(
                    attempt = job.attempts,
                    "Rejecting start: transcription job already processing"
                );
                Err(OrchestratorError::AlreadyProcessing(Box::new(JobReport::from(job))))
            }
            ClaimOutcome::VideoUrlMismatch(job) => Err(OrchestratorError::InvalidArgument(
                format!(
                    "interview {} is already bound to a different videoUrl",
                    job.interview_id
                ),
            )),
        }
    }

    async fn run_claimed(&self, job: TranscriptionJob) -> Result<JobReport, OrchestratorError> {
        let attempt = job.attempts;

        let update = match self.execute_pipeline(&job.video_url).await {
            Ok(transcript) => {
                tracing::info!(chars = transcript.text.len(), "Transcription produced");
                StatusUpdate::Completed(transcript)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Transcription attempt failed");
                StatusUpdate::Failed(e.to_string())
            }
        };
        let completing = matches!(update, StatusUpdate::Completed(_));

        match self
            .job_repository
            .upsert_status(&job.interview_id, attempt, update)
            .await
        {
            Ok(stored) => {
                tracing::info!(status = %stored.status, "Transcription job finished");
                Ok(JobReport::from(stored))
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist transcription outcome");
                if completing {
                    let message = format!("failed to persist transcript: {}", e);
                    if let Err(mark_err) = self
                        .job_repository
                        .upsert_status(&job.interview_id, attempt, StatusUpdate::Failed(message))
                        .await
                    {
                        tracing::warn!(error = %mark_err, "Could not mark job failed");
                    }
                }
                Err(OrchestratorError::Persistence(e))
            }
        }
    }

    async fn execute_pipeline(&self, video_url: &str) -> Result<Transcript, PipelineError> {
        let media = timeout(self.config.fetch_timeout, self.media_fetcher.fetch(video_url))
            .await
            .map_err(|_| PipelineError::FetchTimeout(self.config.fetch_timeout))?
            .map_err(PipelineError::Fetch)?;

        tracing::debug!(bytes = media.len(), "Media fetched");

        let transcript = timeout(
            self.config.transcribe_timeout,
            self.transcription_engine.transcribe(&media),
        )
        .await
        .map_err(|_| PipelineError::EngineTimeout(self.config.transcribe_timeout))?
        .map_err(PipelineError::Engine)?;

        if transcript.text.trim().is_empty() {
            return Err(PipelineError::Engine(TranscriptionError::TranscriptionFailed(
                "engine returned an empty transcript".to_string(),
            )));
        }

        Ok(transcript)
    }
}

fn parse_interview_id(raw: &str) -> Result<InterviewId, OrchestratorError> {
    InterviewId::parse(raw)
        .map_err(|_| OrchestratorError::InvalidArgument("jobId must not be empty".to_string()))
}
