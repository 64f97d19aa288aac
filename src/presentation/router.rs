use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    clear_logs_handler, health_handler, job_status_handler, logs_handler, resumable_handler,
    start_job_handler, submit_job_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/jobs", post(start_job_handler))
        .route("/api/v1/jobs/async", post(submit_job_handler))
        .route("/api/v1/jobs/{interview_id}", get(job_status_handler))
        .route(
            "/api/v1/interviews/{interview_id}/resumable",
            get(resumable_handler),
        )
        .route(
            "/api/v1/logs",
            get(logs_handler).delete(clear_logs_handler),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
