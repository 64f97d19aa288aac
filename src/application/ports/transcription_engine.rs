use async_trait::async_trait;

use crate::domain::Transcript;

#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    async fn transcribe(&self, media: &[u8]) -> Result<Transcript, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("empty media payload")]
    EmptyMedia,
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("unsupported media format: {0}")]
    UnsupportedFormat(String),
    #[error("engine misconfigured: {0}")]
    Misconfigured(String),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("malformed engine response: {0}")]
    MalformedResponse(String),
}
