use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Notify;

use vidscribe::application::ports::JobRepository;
use vidscribe::application::services::{JobOrchestrator, OrchestratorConfig, OrchestratorError};
use vidscribe::domain::{JobStatus, TranscriptionJob};
use vidscribe::infrastructure::persistence::InMemoryJobRepository;

use crate::fakes::{
    CountingEngine, FAILING_VIDEO_URL, FlakyJobRepository, StubMediaFetcher, VIDEO_URL,
    expected_metadata, interview_id, orchestrator_with, test_config,
};

struct Fixture {
    repository: Arc<InMemoryJobRepository>,
    fetcher: Arc<StubMediaFetcher>,
    engine: Arc<CountingEngine>,
}

impl Fixture {
    fn new(engine: CountingEngine) -> Self {
        Self {
            repository: Arc::new(InMemoryJobRepository::new()),
            fetcher: Arc::new(StubMediaFetcher::default()),
            engine: Arc::new(engine),
        }
    }

    fn orchestrator(&self, config: OrchestratorConfig) -> JobOrchestrator {
        orchestrator_with(
            self.repository.clone(),
            self.fetcher.clone(),
            self.engine.clone(),
            config,
        )
    }
}

#[tokio::test]
async fn given_reachable_video_when_starting_job_then_completed_with_transcript_and_metadata() {
    let fixture = Fixture::new(CountingEngine::new());
    let orchestrator = fixture.orchestrator(test_config());

    let report = orchestrator.start_job("job-1", VIDEO_URL).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.status, JobStatus::Completed);
    assert_eq!(report.transcription.as_deref(), Some("hello world"));
    assert_eq!(
        report.metadata.map(|m| m.to_value()),
        Some(expected_metadata())
    );
    assert_eq!(report.error, None);

    let stored = fixture
        .repository
        .find_by_interview(&interview_id("job-1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, JobStatus::Completed);
    assert_eq!(stored.transcript_text.as_deref(), Some("hello world"));
}

#[tokio::test]
async fn given_unreachable_video_when_starting_job_then_failed_with_error_message() {
    let fixture = Fixture::new(CountingEngine::new());
    let orchestrator = fixture.orchestrator(test_config());

    let report = orchestrator
        .start_job("job-2", FAILING_VIDEO_URL)
        .await
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.status, JobStatus::Failed);
    assert!(report.error.as_deref().is_some_and(|e| !e.is_empty()));
    assert_eq!(report.transcription, None);
    assert_eq!(fixture.engine.call_count(), 0);

    let status = orchestrator.get_status("job-2").await.unwrap();
    assert_eq!(status.status, JobStatus::Failed);
}

#[tokio::test]
async fn given_empty_job_id_when_starting_then_invalid_argument_without_mutation() {
    let fixture = Fixture::new(CountingEngine::new());
    let orchestrator = fixture.orchestrator(test_config());

    let result = orchestrator.start_job("  ", VIDEO_URL).await;

    assert!(matches!(result, Err(OrchestratorError::InvalidArgument(_))));
    assert!(
        fixture
            .repository
            .list_by_status(JobStatus::Processing)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(fixture.fetcher.call_count(), 0);
}

#[tokio::test]
async fn given_empty_video_url_when_starting_then_invalid_argument() {
    let fixture = Fixture::new(CountingEngine::new());
    let orchestrator = fixture.orchestrator(test_config());

    let result = orchestrator.start_job("job-3", "").await;

    assert!(matches!(result, Err(OrchestratorError::InvalidArgument(_))));
    assert!(
        fixture
            .repository
            .find_by_interview(&interview_id("job-3"))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn given_two_concurrent_starts_when_racing_then_engine_invoked_once() {
    let fixture = Fixture::new(CountingEngine::slow(Duration::from_millis(50)));
    let orchestrator = fixture.orchestrator(test_config());

    let (first, second) = tokio::join!(
        orchestrator.start_job("job-1", VIDEO_URL),
        orchestrator.start_job("job-1", VIDEO_URL)
    );

    let outcomes = [first, second];
    let completed = outcomes
        .iter()
        .filter(|r| matches!(r, Ok(report) if report.status == JobStatus::Completed))
        .count();
    let rejected = outcomes
        .iter()
        .filter(|r| matches!(r, Err(OrchestratorError::AlreadyProcessing(_))))
        .count();

    assert_eq!(completed, 1);
    assert_eq!(rejected, 1);
    assert_eq!(fixture.engine.call_count(), 1);
}

#[tokio::test]
async fn given_job_in_flight_when_starting_again_then_already_processing_with_current_report() {
    let gate = Arc::new(Notify::new());
    let fixture = Fixture::new(CountingEngine::gated(gate.clone()));
    let orchestrator = fixture.orchestrator(test_config());

    let running = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.start_job("job-1", VIDEO_URL).await })
    };
    while fixture.engine.call_count() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let result = orchestrator.start_job("job-1", VIDEO_URL).await;
    match result {
        Err(OrchestratorError::AlreadyProcessing(report)) => {
            assert_eq!(report.status, JobStatus::Processing);
            assert_eq!(report.attempts, 1);
        }
        other => panic!("expected AlreadyProcessing, got {:?}", other),
    }

    gate.notify_one();
    let finished = running.await.unwrap().unwrap();
    assert_eq!(finished.status, JobStatus::Completed);
    assert_eq!(fixture.engine.call_count(), 1);
}

#[tokio::test]
async fn given_completed_job_when_starting_again_then_stored_result_replayed() {
    let fixture = Fixture::new(CountingEngine::new());
    let orchestrator = fixture.orchestrator(test_config());
    let first = orchestrator.start_job("job-1", VIDEO_URL).await.unwrap();

    let replay = orchestrator.start_job("job-1", VIDEO_URL).await.unwrap();

    assert_eq!(replay, first);
    assert_eq!(fixture.engine.call_count(), 1);
}

#[tokio::test]
async fn given_failed_job_when_starting_again_then_retried_and_completed() {
    let fixture = Fixture::new(CountingEngine::new());
    let mut failed = TranscriptionJob::new(interview_id("job-1"), VIDEO_URL);
    failed.begin_processing(Utc::now()).unwrap();
    failed.fail("media fetch failed: timeout", Utc::now()).unwrap();
    fixture.repository.create(&failed).await.unwrap();
    let orchestrator = fixture.orchestrator(test_config());

    let report = orchestrator.start_job("job-1", VIDEO_URL).await.unwrap();

    assert_eq!(report.status, JobStatus::Completed);
    assert_eq!(report.attempts, 2);
    assert_eq!(report.error, None);
}

#[tokio::test]
async fn given_different_video_url_when_restarting_then_invalid_argument() {
    let fixture = Fixture::new(CountingEngine::new());
    let orchestrator = fixture.orchestrator(test_config());
    orchestrator
        .start_job("job-2", FAILING_VIDEO_URL)
        .await
        .unwrap();

    let result = orchestrator.start_job("job-2", VIDEO_URL).await;

    assert!(matches!(result, Err(OrchestratorError::InvalidArgument(_))));
}

#[tokio::test]
async fn given_slow_engine_when_transcribe_timeout_elapses_then_job_failed_with_timeout() {
    let fixture = Fixture::new(CountingEngine::slow(Duration::from_millis(500)));
    let orchestrator = fixture.orchestrator(OrchestratorConfig {
        transcribe_timeout: Duration::from_millis(20),
        ..test_config()
    });

    let report = orchestrator.start_job("job-1", VIDEO_URL).await.unwrap();

    assert_eq!(report.status, JobStatus::Failed);
    assert!(report.error.unwrap().contains("timed out"));
}

#[tokio::test]
async fn given_slow_fetch_when_fetch_timeout_elapses_then_engine_not_called() {
    let fixture = Fixture {
        repository: Arc::new(InMemoryJobRepository::new()),
        fetcher: Arc::new(StubMediaFetcher::slow(Duration::from_millis(500))),
        engine: Arc::new(CountingEngine::new()),
    };
    let orchestrator = fixture.orchestrator(OrchestratorConfig {
        fetch_timeout: Duration::from_millis(20),
        ..test_config()
    });

    let report = orchestrator.start_job("job-1", VIDEO_URL).await.unwrap();

    assert_eq!(report.status, JobStatus::Failed);
    assert!(report.error.unwrap().contains("media fetch timed out"));
    assert_eq!(fixture.engine.call_count(), 0);
}

#[tokio::test]
async fn given_blank_transcript_when_engine_returns_then_job_failed() {
    let fixture = Fixture::new(CountingEngine::with_text("   "));
    let orchestrator = fixture.orchestrator(test_config());

    let report = orchestrator.start_job("job-1", VIDEO_URL).await.unwrap();

    assert_eq!(report.status, JobStatus::Failed);
    assert!(report.error.unwrap().contains("empty transcript"));
}

#[tokio::test]
async fn given_stale_processing_job_when_starting_then_reclaimed_as_new_attempt() {
    let fixture = Fixture::new(CountingEngine::new());
    let mut abandoned = TranscriptionJob::new(interview_id("job-1"), VIDEO_URL);
    abandoned
        .begin_processing(Utc::now() - chrono::Duration::hours(1))
        .unwrap();
    fixture.repository.create(&abandoned).await.unwrap();
    let orchestrator = fixture.orchestrator(test_config());

    let report = orchestrator.start_job("job-1", VIDEO_URL).await.unwrap();

    assert_eq!(report.status, JobStatus::Completed);
    assert_eq!(report.attempts, 2);
}

#[tokio::test]
async fn given_unwritable_outcome_when_completing_then_persistence_error() {
    let repository = Arc::new(FlakyJobRepository::failing_status_writes());
    let engine = Arc::new(CountingEngine::new());
    let orchestrator = orchestrator_with(
        repository.clone(),
        Arc::new(StubMediaFetcher::default()),
        engine.clone(),
        test_config(),
    );

    let result = orchestrator.start_job("job-1", VIDEO_URL).await;

    assert!(matches!(result, Err(OrchestratorError::Persistence(_))));
    assert_eq!(engine.call_count(), 1);
}

#[tokio::test]
async fn given_unknown_interview_when_getting_status_then_not_found() {
    let fixture = Fixture::new(CountingEngine::new());
    let orchestrator = fixture.orchestrator(test_config());

    let result = orchestrator.get_status("nope").await;

    assert!(matches!(result, Err(OrchestratorError::NotFound(id)) if id.as_str() == "nope"));
}

#[tokio::test]
async fn given_submitted_job_when_polling_then_eventually_completed() {
    let fixture = Fixture::new(CountingEngine::slow(Duration::from_millis(20)));
    let orchestrator = fixture.orchestrator(test_config());

    let accepted = orchestrator.submit_job("job-1", VIDEO_URL).await.unwrap();
    assert_eq!(accepted.status, JobStatus::Processing);

    let mut status = accepted.status;
    for _ in 0..100 {
        status = orchestrator.get_status("job-1").await.unwrap().status;
        if status != JobStatus::Processing {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(status, JobStatus::Completed);
    assert_eq!(fixture.engine.call_count(), 1);
}

#[test]
fn given_stale_threshold_within_pipeline_timeouts_when_building_config_then_rejected() {
    let result = OrchestratorConfig::new(
        Duration::from_secs(120),
        Duration::from_secs(600),
        Duration::from_secs(60),
    );

    let error = result.unwrap_err();
    assert_eq!(error.stale_after, Duration::from_secs(60));
    assert_eq!(error.pipeline_budget, Duration::from_secs(720));
}

#[test]
fn given_stale_threshold_equal_to_pipeline_timeouts_when_building_config_then_rejected() {
    let result = OrchestratorConfig::new(
        Duration::from_secs(10),
        Duration::from_secs(50),
        Duration::from_secs(60),
    );

    assert!(result.is_err());
}

#[test]
fn given_stale_threshold_beyond_pipeline_timeouts_when_building_config_then_accepted() {
    let config = OrchestratorConfig::new(
        Duration::from_secs(120),
        Duration::from_secs(600),
        Duration::from_secs(900),
    )
    .unwrap();

    assert_eq!(config.stale_after, Duration::from_secs(900));
}
