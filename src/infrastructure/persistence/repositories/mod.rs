mod in_memory_interview_repository;
mod in_memory_job_repository;
mod pg_interview_repository;
mod pg_job_repository;

pub use in_memory_interview_repository::InMemoryInterviewRepository;
pub use in_memory_job_repository::InMemoryJobRepository;
pub use pg_interview_repository::PgInterviewRepository;
pub use pg_job_repository::PgJobRepository;
