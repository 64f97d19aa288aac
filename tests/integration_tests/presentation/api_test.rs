use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;

use vidscribe::application::ports::JobRepository;
use vidscribe::application::services::ResumeReconciler;
use vidscribe::domain::{Interview, LogEntry, LogLevel, TranscriptionJob};
use vidscribe::infrastructure::observability::{LogSink, LogSinkLayer};
use vidscribe::infrastructure::persistence::{InMemoryInterviewRepository, InMemoryJobRepository};
use vidscribe::presentation::{AppState, create_router};

use crate::fakes::{
    CountingEngine, FAILING_VIDEO_URL, StubMediaFetcher, VIDEO_URL, expected_metadata,
    interview_id, orchestrator_with, test_config,
};

struct TestApp {
    router: Router,
    jobs: Arc<InMemoryJobRepository>,
    interviews: Arc<InMemoryInterviewRepository>,
    engine: Arc<CountingEngine>,
    log_sink: LogSink,
}

impl TestApp {
    fn new() -> Self {
        let jobs = Arc::new(InMemoryJobRepository::new());
        let interviews = Arc::new(InMemoryInterviewRepository::new());
        let engine = Arc::new(CountingEngine::new());
        let log_sink = LogSink::default();

        let orchestrator = orchestrator_with(
            jobs.clone(),
            Arc::new(StubMediaFetcher::default()),
            engine.clone(),
            test_config(),
        );
        let reconciler = ResumeReconciler::new(interviews.clone(), jobs.clone());
        let state = AppState::new(Arc::new(orchestrator), Arc::new(reconciler), log_sink.clone());

        Self {
            router: create_router(state),
            jobs,
            interviews,
            engine,
            log_sink,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

#[tokio::test]
async fn given_running_server_when_health_check_then_returns_ok() {
    let app = TestApp::new();

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn given_reachable_video_when_starting_job_then_transcript_returned() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/v1/jobs", json!({"jobId": "job-1", "videoUrl": VIDEO_URL}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["transcription"], "hello world");
    assert_eq!(body["metadata"], expected_metadata());
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn given_unreachable_video_when_starting_job_then_success_false_with_error() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            "/api/v1/jobs",
            json!({"jobId": "job-2", "videoUrl": FAILING_VIDEO_URL}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], "failed");
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn given_missing_job_id_when_starting_job_then_bad_request() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/v1/jobs", json!({"videoUrl": VIDEO_URL}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("jobId"));
}

#[tokio::test]
async fn given_malformed_json_when_starting_job_then_bad_request() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/v1/jobs")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn given_job_in_flight_when_starting_job_then_conflict() {
    let app = TestApp::new();
    let mut job = TranscriptionJob::new(interview_id("job-1"), VIDEO_URL);
    job.begin_processing(Utc::now()).unwrap();
    app.jobs.create(&job).await.unwrap();

    let (status, body) = app
        .post_json("/api/v1/jobs", json!({"jobId": "job-1", "videoUrl": VIDEO_URL}))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(app.engine.call_count(), 0);
}

#[tokio::test]
async fn given_started_job_when_getting_status_then_completed_report() {
    let app = TestApp::new();
    app.post_json("/api/v1/jobs", json!({"jobId": "job-1", "videoUrl": VIDEO_URL}))
        .await;

    let (status, body) = app.get("/api/v1/jobs/job-1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["jobId"], "job-1");
    assert_eq!(body["status"], "completed");
    assert_eq!(body["transcription"], "hello world");
    assert_eq!(body["attempts"], 1);
}

#[tokio::test]
async fn given_failed_job_when_getting_status_then_successful_read_of_failed_status() {
    let app = TestApp::new();
    app.post_json(
        "/api/v1/jobs",
        json!({"jobId": "job-2", "videoUrl": FAILING_VIDEO_URL}),
    )
    .await;

    let (status, body) = app.get("/api/v1/jobs/job-2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "failed");
    assert!(!body["error"].as_str().unwrap().is_empty());
    assert!(body.get("transcription").is_none());
}

#[tokio::test]
async fn given_unknown_job_when_getting_status_then_not_found() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/v1/jobs/missing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn given_async_submission_when_accepted_then_processing_returned() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            "/api/v1/jobs/async",
            json!({"jobId": "job-9", "videoUrl": VIDEO_URL}),
        )
        .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "processing");
}

#[tokio::test]
async fn given_interview_without_video_when_checking_resumable_then_can_resume() {
    let app = TestApp::new();
    app.interviews
        .upsert(Interview::new(interview_id("interview-1"), None))
        .await;

    let (status, body) = app.get("/api/v1/interviews/interview-1/resumable").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["canResume"], true);
    assert_eq!(body["interview"]["id"], "interview-1");
    assert!(body.get("jobStatus").is_none());
}

#[tokio::test]
async fn given_finished_interview_when_checking_resumable_then_cannot_resume() {
    let app = TestApp::new();
    app.interviews
        .upsert(Interview::new(
            interview_id("interview-2"),
            Some(VIDEO_URL.to_string()),
        ))
        .await;

    let (status, body) = app.get("/api/v1/interviews/interview-2/resumable").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["canResume"], false);
    assert_eq!(body["interview"]["videoUrl"], VIDEO_URL);
}

#[tokio::test]
async fn given_unknown_interview_when_checking_resumable_then_not_found() {
    let app = TestApp::new();

    let (status, _) = app.get("/api/v1/interviews/ghost/resumable").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_captured_logs_when_querying_since_then_only_newer_entries() {
    let app = TestApp::new();
    let cutoff = Utc::now();
    app.log_sink.push(LogEntry::at(
        cutoff - Duration::seconds(30),
        LogLevel::Info,
        "before".to_string(),
        "test".to_string(),
    ));
    app.log_sink.push(LogEntry::at(
        cutoff + Duration::seconds(1),
        LogLevel::Error,
        "after".to_string(),
        "test".to_string(),
    ));

    let since = cutoff.to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    let (status, body) = app.get(&format!("/api/v1/logs?since={}", since)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["logs"][0]["message"], "after");
    assert_eq!(body["logs"][0]["level"], "error");
}

#[tokio::test]
async fn given_invalid_since_when_querying_logs_then_bad_request() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/v1/logs?since=yesterday").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn given_captured_logs_when_clearing_then_follow_up_query_is_empty() {
    let app = TestApp::new();
    // Current-thread runtime, so handlers run under this thread's subscriber.
    let _guard = tracing::subscriber::set_default(
        tracing_subscriber::registry()
            .with(LogSinkLayer::new(app.log_sink.clone(), LevelFilter::INFO)),
    );
    tracing::warn!("something happened");
    let (_, before) = app.get("/api/v1/logs").await;
    assert_eq!(before["count"], 1);

    let (status, body) = app
        .send(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/logs")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let (status, after) = app.get("/api/v1/logs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["count"], 0);
    assert!(app.log_sink.is_empty());
}
