use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use vidscribe::application::ports::{InterviewRepository, JobRepository};
use vidscribe::application::services::{JobOrchestrator, ResumeReconciler, StaleJobSweeper};
use vidscribe::infrastructure::media::MediaFetcherFactory;
use vidscribe::infrastructure::observability::{LogSink, TracingConfig, init_tracing};
use vidscribe::infrastructure::persistence::{
    InMemoryInterviewRepository, InMemoryJobRepository, PgInterviewRepository, PgJobRepository,
    create_pool, run_migrations,
};
use vidscribe::infrastructure::transcription::TranscriptionEngineFactory;
use vidscribe::presentation::config::DatabaseSettings;
use vidscribe::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("failed to load settings")?;

    let log_sink = LogSink::new(settings.logging.sink_capacity);
    init_tracing(
        TracingConfig::new(
            environment.as_str(),
            settings.logging.enable_json,
            settings.logging.level.clone(),
        ),
        settings.server.port,
        log_sink.clone(),
    );

    let (job_repository, interview_repository) = build_repositories(&settings.database).await?;

    let media_fetcher =
        MediaFetcherFactory::create(&settings.media).context("failed to build media fetcher")?;
    let transcription_engine = TranscriptionEngineFactory::create(&settings.transcription)
        .context("failed to build transcription engine")?;

    let orchestrator = Arc::new(JobOrchestrator::new(
        Arc::clone(&job_repository),
        media_fetcher,
        transcription_engine,
        settings
            .jobs
            .orchestrator_config()
            .context("invalid job settings")?,
    ));
    let reconciler = Arc::new(ResumeReconciler::new(
        interview_repository,
        Arc::clone(&job_repository),
    ));

    let sweeper = StaleJobSweeper::new(
        Arc::clone(&job_repository),
        settings.jobs.stale_after(),
        settings.jobs.sweep_interval(),
    );
    tokio::spawn(sweeper.run());

    let router = create_router(AppState::new(orchestrator, reconciler, log_sink));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn build_repositories(
    database: &DatabaseSettings,
) -> anyhow::Result<(Arc<dyn JobRepository>, Arc<dyn InterviewRepository>)> {
    let Some(url) = database.url.as_deref() else {
        tracing::warn!("No database url configured; jobs are kept in memory");
        return Ok((
            Arc::new(InMemoryJobRepository::new()),
            Arc::new(InMemoryInterviewRepository::new()),
        ));
    };

    let pool = create_pool(url, database.max_connections)
        .await
        .context("failed to connect to database")?;
    if database.run_migrations {
        run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
    }

    Ok((
        Arc::new(PgJobRepository::new(pool.clone())),
        Arc::new(PgInterviewRepository::new(pool)),
    ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
