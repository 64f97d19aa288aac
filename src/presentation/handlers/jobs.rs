use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::services::JobReport;
use crate::domain::{JobStatus, TranscriptMetadata};
use crate::presentation::state::AppState;

use super::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartJobRequest {
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub video_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub success: bool,
    pub job_id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TranscriptMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub attempts: u32,
    pub updated_at: DateTime<Utc>,
}

impl From<JobReport> for JobResponse {
    fn from(report: JobReport) -> Self {
        Self {
            success: report.is_success(),
            job_id: report.interview_id.to_string(),
            status: report.status,
            transcription: report.transcription,
            metadata: report.metadata,
            error: report.error,
            attempts: report.attempts,
            updated_at: report.updated_at,
        }
    }
}

/// Runs the job inline. A failed transcription is still a 200 with `success: false`.
#[tracing::instrument(skip(state, payload))]
pub async fn start_job_handler(
    State(state): State<AppState>,
    payload: Result<Json<StartJobRequest>, JsonRejection>,
) -> Result<Json<JobResponse>, ApiError> {
    let Json(request) = payload?;

    let report = state
        .orchestrator
        .start_job(&request.job_id, &request.video_url)
        .await?;

    if !report.is_success() {
        tracing::warn!(
            interview_id = %report.interview_id,
            error = report.error.as_deref().unwrap_or_default(),
            "Transcription job failed"
        );
    }

    Ok(Json(JobResponse::from(report)))
}

#[tracing::instrument(skip(state, payload))]
pub async fn submit_job_handler(
    State(state): State<AppState>,
    payload: Result<Json<StartJobRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;

    let report = state
        .orchestrator
        .submit_job(&request.job_id, &request.video_url)
        .await?;

    // Anything other than `processing` is a replayed completed job.
    let status = if report.status == JobStatus::Processing {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };

    let mut response = JobResponse::from(report);
    response.success = true;

    Ok((status, Json(response)))
}
