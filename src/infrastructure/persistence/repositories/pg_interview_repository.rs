use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use crate::application::ports::{InterviewRepository, RepositoryError};
use crate::domain::{Interview, InterviewId};

/// Read-only view over the platform's `interviews` table.
pub struct PgInterviewRepository {
    pool: PgPool,
}

impl PgInterviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct InterviewRow {
    id: String,
    video_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl InterviewRepository for PgInterviewRepository {
    #[instrument(skip(self), fields(interview_id = %id))]
    async fn get_interview(&self, id: &InterviewId) -> Result<Option<Interview>, RepositoryError> {
        let row: Option<InterviewRow> = sqlx::query_as(
            r#"
            SELECT id, video_url, created_at, updated_at
            FROM interviews
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.map(|r| -> Result<Interview, RepositoryError> {
            let id = InterviewId::parse(r.id)
                .map_err(|e| RepositoryError::InvalidRecord(e.to_string()))?;
            Ok(Interview {
                id,
                video_url: r.video_url,
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
        })
        .transpose()
    }
}
