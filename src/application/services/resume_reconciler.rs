use std::sync::Arc;

use crate::application::ports::{InterviewRepository, JobRepository, RepositoryError};
use crate::domain::{Interview, InterviewId, JobStatus};

const COMPLETED_MESSAGE: &str = "Interview already completed; its video asset is stored";
const RESUMABLE_MESSAGE: &str =
    "Interview upload is not complete; resume from any locally buffered recording chunks";

#[derive(Debug, Clone, PartialEq)]
pub struct ResumeDecision {
    pub can_resume: bool,
    pub interview: Interview,
    pub message: String,
    /// Status of the interview's transcription job, if one was ever started.
    pub job_status: Option<JobStatus>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("interview not found: {0}")]
    NotFound(InterviewId),
    #[error("persistence: {0}")]
    Persistence(#[from] RepositoryError),
}

/// Tells a reconnecting client whether an interview is finished or resumable.
///
/// The server only knows whether a final asset exists; whether the client has
/// bytes left to resend is answered by its own local upload state.
pub struct ResumeReconciler {
    interview_repository: Arc<dyn InterviewRepository>,
    job_repository: Arc<dyn JobRepository>,
}

impl ResumeReconciler {
    pub fn new(
        interview_repository: Arc<dyn InterviewRepository>,
        job_repository: Arc<dyn JobRepository>,
    ) -> Self {
        Self {
            interview_repository,
            job_repository,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn check_resumable(
        &self,
        interview_id: &str,
    ) -> Result<ResumeDecision, ReconcileError> {
        let interview_id = InterviewId::parse(interview_id).map_err(|_| {
            ReconcileError::InvalidArgument("interviewId must not be empty".to_string())
        })?;

        let interview = self
            .interview_repository
            .get_interview(&interview_id)
            .await?
            .ok_or_else(|| ReconcileError::NotFound(interview_id.clone()))?;

        let job_status = self
            .job_repository
            .find_by_interview(&interview_id)
            .await?
            .map(|job| job.status);

        let can_resume = !interview.has_final_asset();
        let message = if can_resume {
            RESUMABLE_MESSAGE
        } else {
            COMPLETED_MESSAGE
        };

        tracing::debug!(can_resume, job_status = ?job_status, "Resume check evaluated");

        Ok(ResumeDecision {
            can_resume,
            interview,
            message: message.to_string(),
            job_status,
        })
    }
}
