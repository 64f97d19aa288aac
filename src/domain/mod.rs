mod interview;
mod interview_id;
mod job;
mod job_status;
mod log_entry;
mod transcript;

pub use interview::Interview;
pub use interview_id::{InterviewId, InvalidInterviewId};
pub use job::{JobTransitionError, TranscriptionJob};
pub use job_status::JobStatus;
pub use log_entry::{LogEntry, LogLevel};
pub use transcript::{Transcript, TranscriptMetadata};
