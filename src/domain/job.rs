use chrono::{DateTime, Utc};

use super::{InterviewId, JobStatus, Transcript, TranscriptMetadata};

/// One attempt-history record of transcribing an interview's video.
///
/// The job is keyed by its interview; all state changes go through the
/// transition methods so that `transcript_text` is only present when
/// completed and `error_message` only when failed.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionJob {
    pub interview_id: InterviewId,
    pub status: JobStatus,
    pub video_url: String,
    pub transcript_text: Option<String>,
    pub metadata: Option<TranscriptMetadata>,
    pub error_message: Option<String>,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobTransitionError {
    #[error("illegal job transition from {from} to {to}")]
    Illegal { from: JobStatus, to: JobStatus },
    #[error("job is processing and not yet stale")]
    NotStale,
    #[error("transcript text must not be empty")]
    EmptyTranscript,
    #[error("failure message must not be empty")]
    EmptyErrorMessage,
}

impl TranscriptionJob {
    pub fn new(interview_id: InterviewId, video_url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            interview_id,
            status: JobStatus::Pending,
            video_url: video_url.into(),
            transcript_text: None,
            metadata: None,
            error_message: None,
            attempts: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn begin_processing(&mut self, now: DateTime<Utc>) -> Result<(), JobTransitionError> {
        self.ensure_transition(JobStatus::Processing)?;
        self.enter_processing(now);
        Ok(())
    }

    /// Takes over a `processing` job whose last update predates `stale_before`.
    pub fn reclaim_stale(
        &mut self,
        now: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> Result<(), JobTransitionError> {
        if self.status != JobStatus::Processing {
            return Err(JobTransitionError::Illegal {
                from: self.status,
                to: JobStatus::Processing,
            });
        }
        if !self.is_stale(stale_before) {
            return Err(JobTransitionError::NotStale);
        }
        self.enter_processing(now);
        Ok(())
    }

    pub fn complete(
        &mut self,
        transcript: Transcript,
        now: DateTime<Utc>,
    ) -> Result<(), JobTransitionError> {
        if transcript.text.trim().is_empty() {
            return Err(JobTransitionError::EmptyTranscript);
        }
        self.ensure_transition(JobStatus::Completed)?;
        self.status = JobStatus::Completed;
        self.transcript_text = Some(transcript.text);
        self.metadata = Some(transcript.metadata);
        self.error_message = None;
        self.updated_at = now;
        Ok(())
    }

    pub fn fail(
        &mut self,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), JobTransitionError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(JobTransitionError::EmptyErrorMessage);
        }
        self.ensure_transition(JobStatus::Failed)?;
        self.status = JobStatus::Failed;
        self.transcript_text = None;
        self.metadata = None;
        self.error_message = Some(message);
        self.updated_at = now;
        Ok(())
    }

    pub fn is_stale(&self, stale_before: DateTime<Utc>) -> bool {
        self.status == JobStatus::Processing && self.updated_at < stale_before
    }

    fn ensure_transition(&self, next: JobStatus) -> Result<(), JobTransitionError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(JobTransitionError::Illegal {
                from: self.status,
                to: next,
            })
        }
    }

    fn enter_processing(&mut self, now: DateTime<Utc>) {
        self.status = JobStatus::Processing;
        self.transcript_text = None;
        self.metadata = None;
        self.error_message = None;
        self.attempts += 1;
        self.updated_at = now;
    }
}
