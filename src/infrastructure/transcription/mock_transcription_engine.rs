use async_trait::async_trait;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::{Transcript, TranscriptMetadata};

/// Engine for local runs without provider credentials. Reports the media size
/// it was given so the round trip is visible in the stored metadata.
pub struct MockTranscriptionEngine {
    text: String,
}

impl MockTranscriptionEngine {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for MockTranscriptionEngine {
    fn default() -> Self {
        Self::new("mock transcript")
    }
}

#[async_trait]
impl TranscriptionEngine for MockTranscriptionEngine {
    async fn transcribe(&self, media: &[u8]) -> Result<Transcript, TranscriptionError> {
        if media.is_empty() {
            return Err(TranscriptionError::EmptyMedia);
        }

        let metadata = TranscriptMetadata::new()
            .with("language", "en")
            .with("mediaBytes", media.len())
            .with("engine", "mock");
        Ok(Transcript::new(self.text.clone(), metadata))
    }
}
