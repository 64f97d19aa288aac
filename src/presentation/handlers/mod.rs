mod error;
mod health;
mod job_status;
mod jobs;
mod logs;
mod resumable;

pub use error::{ApiError, ErrorResponse};
pub use health::health_handler;
pub use job_status::job_status_handler;
pub use jobs::{JobResponse, StartJobRequest, start_job_handler, submit_job_handler};
pub use logs::{clear_logs_handler, logs_handler};
pub use resumable::{ResumableResponse, resumable_handler};
