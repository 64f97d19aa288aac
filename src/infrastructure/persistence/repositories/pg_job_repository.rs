use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::instrument;

use crate::application::ports::{ClaimOutcome, JobRepository, RepositoryError, StatusUpdate};
use crate::domain::{InterviewId, JobStatus, TranscriptMetadata, TranscriptionJob};

const SELECT_COLUMNS: &str = r#"
    SELECT interview_id, status, video_url, transcript_text, metadata, error_message,
           attempts, created_at, updated_at
    FROM transcription_jobs
"#;

pub struct PgJobRepository {
    pool: PgPool,
}

impl PgJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct JobRow {
    interview_id: String,
    status: String,
    video_url: String,
    transcript_text: Option<String>,
    metadata: Option<Json<Value>>,
    error_message: Option<String>,
    attempts: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for TranscriptionJob {
    type Error = RepositoryError;

    fn try_from(r: JobRow) -> Result<Self, Self::Error> {
        let interview_id = InterviewId::parse(r.interview_id)
            .map_err(|e| RepositoryError::InvalidRecord(e.to_string()))?;
        let status = r
            .status
            .parse::<JobStatus>()
            .map_err(RepositoryError::InvalidRecord)?;
        let metadata = match r.metadata {
            Some(Json(value)) => Some(TranscriptMetadata::from_value(value).ok_or_else(|| {
                RepositoryError::InvalidRecord(format!(
                    "metadata of interview {} is not an object",
                    interview_id
                ))
            })?),
            None => None,
        };
        let attempts = u32::try_from(r.attempts)
            .map_err(|e| RepositoryError::InvalidRecord(format!("attempts: {}", e)))?;

        Ok(TranscriptionJob {
            interview_id,
            status,
            video_url: r.video_url,
            transcript_text: r.transcript_text,
            metadata,
            error_message: r.error_message,
            attempts,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

fn query_failed(e: sqlx::Error) -> RepositoryError {
    RepositoryError::QueryFailed(e.to_string())
}

async fn lock_job(
    conn: &mut PgConnection,
    interview_id: &InterviewId,
) -> Result<Option<TranscriptionJob>, RepositoryError> {
    let sql = format!("{} WHERE interview_id = $1 FOR UPDATE", SELECT_COLUMNS);
    let row: Option<JobRow> = sqlx::query_as(&sql)
        .bind(interview_id.as_str())
        .fetch_optional(conn)
        .await
        .map_err(query_failed)?;

    row.map(TranscriptionJob::try_from).transpose()
}

async fn save_job(conn: &mut PgConnection, job: &TranscriptionJob) -> Result<(), RepositoryError> {
    let attempts = i32::try_from(job.attempts)
        .map_err(|e| RepositoryError::ConstraintViolation(format!("attempts: {}", e)))?;

    sqlx::query(
        r#"
        UPDATE transcription_jobs
        SET status = $1, transcript_text = $2, metadata = $3, error_message = $4,
            attempts = $5, updated_at = $6
        WHERE interview_id = $7
        "#,
    )
    .bind(job.status.as_str())
    .bind(job.transcript_text.as_deref())
    .bind(job.metadata.as_ref().map(|m| Json(m.to_value())))
    .bind(job.error_message.as_deref())
    .bind(attempts)
    .bind(job.updated_at)
    .bind(job.interview_id.as_str())
    .execute(conn)
    .await
    .map_err(query_failed)?;

    Ok(())
}

#[async_trait]
impl JobRepository for PgJobRepository {
    #[instrument(skip(self, job), fields(interview_id = %job.interview_id))]
    async fn create(&self, job: &TranscriptionJob) -> Result<(), RepositoryError> {
        let attempts = i32::try_from(job.attempts)
            .map_err(|e| RepositoryError::ConstraintViolation(format!("attempts: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO transcription_jobs
                (interview_id, status, video_url, transcript_text, metadata, error_message,
                 attempts, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(job.interview_id.as_str())
        .bind(job.status.as_str())
        .bind(&job.video_url)
        .bind(job.transcript_text.as_deref())
        .bind(job.metadata.as_ref().map(|m| Json(m.to_value())))
        .bind(job.error_message.as_deref())
        .bind(attempts)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db) if db.is_unique_violation() => RepositoryError::ConstraintViolation(format!(
                "job for interview {} already exists",
                job.interview_id
            )),
            _ => query_failed(e),
        })?;

        Ok(())
    }

    #[instrument(skip(self), fields(interview_id = %interview_id))]
    async fn find_by_interview(
        &self,
        interview_id: &InterviewId,
    ) -> Result<Option<TranscriptionJob>, RepositoryError> {
        let sql = format!("{} WHERE interview_id = $1", SELECT_COLUMNS);
        let row: Option<JobRow> = sqlx::query_as(&sql)
            .bind(interview_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed)?;

        row.map(TranscriptionJob::try_from).transpose()
    }

    #[instrument(skip(self, video_url), fields(interview_id = %interview_id))]
    async fn claim(
        &self,
        interview_id: &InterviewId,
        video_url: &str,
        stale_before: DateTime<Utc>,
    ) -> Result<ClaimOutcome, RepositoryError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(query_failed)?;

        sqlx::query(
            r#"
            INSERT INTO transcription_jobs (interview_id, status, video_url, attempts, created_at, updated_at)
            VALUES ($1, $2, $3, 0, $4, $4)
            ON CONFLICT (interview_id) DO NOTHING
            "#,
        )
        .bind(interview_id.as_str())
        .bind(JobStatus::Pending.as_str())
        .bind(video_url)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(query_failed)?;

        let current = lock_job(&mut *tx, interview_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(interview_id.to_string()))?;

        let outcome = ClaimOutcome::resolve(current, video_url, now, stale_before);
        if let ClaimOutcome::Claimed(job) = &outcome {
            save_job(&mut *tx, job).await?;
        }

        tx.commit().await.map_err(query_failed)?;
        Ok(outcome)
    }

    #[instrument(skip(self, update), fields(interview_id = %interview_id))]
    async fn upsert_status(
        &self,
        interview_id: &InterviewId,
        attempt: u32,
        update: StatusUpdate,
    ) -> Result<TranscriptionJob, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(query_failed)?;

        let mut job = lock_job(&mut *tx, interview_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(interview_id.to_string()))?;
        update.apply_to(&mut job, attempt, Utc::now())?;
        save_job(&mut *tx, &job).await?;

        tx.commit().await.map_err(query_failed)?;
        Ok(job)
    }

    #[instrument(skip(self, message), fields(interview_id = %interview_id))]
    async fn expire_if_stale(
        &self,
        interview_id: &InterviewId,
        stale_before: DateTime<Utc>,
        message: &str,
    ) -> Result<Option<TranscriptionJob>, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(query_failed)?;

        let Some(mut job) = lock_job(&mut *tx, interview_id).await? else {
            return Ok(None);
        };
        if !job.is_stale(stale_before) {
            return Ok(None);
        }
        job.fail(message, Utc::now())
            .map_err(|e| RepositoryError::ConstraintViolation(e.to_string()))?;
        save_job(&mut *tx, &job).await?;

        tx.commit().await.map_err(query_failed)?;
        Ok(Some(job))
    }

    #[instrument(skip(self), fields(status = %status))]
    async fn list_by_status(
        &self,
        status: JobStatus,
    ) -> Result<Vec<TranscriptionJob>, RepositoryError> {
        let sql = format!("{} WHERE status = $1 ORDER BY created_at DESC", SELECT_COLUMNS);
        let rows: Vec<JobRow> = sqlx::query_as(&sql)
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(query_failed)?;

        rows.into_iter().map(TranscriptionJob::try_from).collect()
    }
}
