use axum::Json;
use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::LogEntry;
use crate::presentation::state::AppState;

use super::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub since: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub success: bool,
    pub count: usize,
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Serialize)]
pub struct ClearLogsResponse {
    pub success: bool,
}

pub async fn logs_handler(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, ApiError> {
    let since = match query.since.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            DateTime::parse_from_rfc3339(raw)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| ApiError::BadRequest(format!("invalid since '{}': {}", raw, e)))?,
        ),
    };

    let logs = state.log_sink.query(since);
    Ok(Json(LogsResponse {
        success: true,
        count: logs.len(),
        logs,
    }))
}

/// Logs before clearing so a follow-up query starts from an empty buffer.
pub async fn clear_logs_handler(State(state): State<AppState>) -> Json<ClearLogsResponse> {
    tracing::info!(discarded = state.log_sink.len(), "Clearing log sink");
    state.log_sink.clear();
    Json(ClearLogsResponse { success: true })
}
