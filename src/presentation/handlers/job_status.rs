use axum::Json;
use axum::extract::{Path, State};

use crate::presentation::state::AppState;

use super::error::ApiError;
use super::jobs::JobResponse;

/// `success` reports the lookup, not the job; a failed job is still a successful read.
#[tracing::instrument(skip(state))]
pub async fn job_status_handler(
    State(state): State<AppState>,
    Path(interview_id): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    let report = state.orchestrator.get_status(&interview_id).await?;

    let mut response = JobResponse::from(report);
    response.success = true;
    Ok(Json(response))
}
