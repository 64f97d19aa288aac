mod interview_repository;
mod job_repository;
mod media_fetcher;
mod repository_error;
mod transcription_engine;

pub use interview_repository::InterviewRepository;
pub use job_repository::{ClaimOutcome, JobRepository, StatusUpdate};
pub use media_fetcher::{FetchError, MediaFetcher};
pub use repository_error::RepositoryError;
pub use transcription_engine::{TranscriptionEngine, TranscriptionError};
