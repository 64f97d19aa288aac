use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use crate::domain::{Interview, JobStatus};
use crate::presentation::state::AppState;

use super::error::ApiError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumableResponse {
    pub success: bool,
    pub can_resume: bool,
    pub interview: Interview,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_status: Option<JobStatus>,
}

#[tracing::instrument(skip(state))]
pub async fn resumable_handler(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
) -> Result<Json<ResumableResponse>, ApiError> {
    let decision = state.reconciler.check_resumable(&interview_id).await?;

    Ok(Json(ResumableResponse {
        success: true,
        can_resume: decision.can_resume,
        interview: decision.interview,
        message: decision.message,
        job_status: decision.job_status,
    }))
}
