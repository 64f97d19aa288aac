use async_trait::async_trait;
use reqwest::multipart;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::Transcript;

use super::whisper_response::{VerboseTranscription, media_part_name};

pub struct AzureWhisperEngine {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl AzureWhisperEngine {
    pub fn new(base_url: &str, deployment: &str, api_key: &str, api_version: &str) -> Self {
        let endpoint = format!(
            "{}/openai/deployments/{}/audio/transcriptions?api-version={}",
            base_url.trim_end_matches('/'),
            deployment,
            api_version,
        );
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl TranscriptionEngine for AzureWhisperEngine {
    async fn transcribe(&self, media: &[u8]) -> Result<Transcript, TranscriptionError> {
        if media.is_empty() {
            return Err(TranscriptionError::EmptyMedia);
        }

        let (file_name, mime) = media_part_name(media);
        let file_part = multipart::Part::bytes(media.to_vec())
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("mime: {}", e)))?;

        let form = multipart::Form::new()
            .text("response_format", "verbose_json")
            .part("file", file_part);

        tracing::debug!(endpoint = %self.endpoint, "Sending media to Azure OpenAI Whisper");

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranscriptionError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let result: VerboseTranscription = response
            .json()
            .await
            .map_err(|e| TranscriptionError::MalformedResponse(format!("parse response: {}", e)))?;
        let transcript = result.into_transcript()?;

        tracing::info!(
            chars = transcript.text.len(),
            "Azure OpenAI Whisper transcription completed"
        );

        Ok(transcript)
    }
}
