use std::sync::Arc;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::presentation::config::{TranscriptionProviderSetting, TranscriptionSettings};

use super::azure_whisper_engine::AzureWhisperEngine;
use super::mock_transcription_engine::MockTranscriptionEngine;
use super::openai_whisper_engine::OpenAiWhisperEngine;

const DEFAULT_AZURE_API_VERSION: &str = "2024-06-01";

pub struct TranscriptionEngineFactory;

impl TranscriptionEngineFactory {
    pub fn create(
        settings: &TranscriptionSettings,
    ) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError> {
        match settings.provider {
            TranscriptionProviderSetting::OpenAi => {
                let key = required(settings.api_key.as_deref(), "api_key")?;
                let engine = OpenAiWhisperEngine::new(
                    key.to_string(),
                    settings.base_url.clone(),
                    Some(settings.model.clone()),
                );
                Ok(Arc::new(engine))
            }
            TranscriptionProviderSetting::Azure => {
                let key = required(settings.api_key.as_deref(), "api_key")?;
                let base_url = required(settings.base_url.as_deref(), "base_url")?;
                let deployment = required(settings.azure_deployment.as_deref(), "azure_deployment")?;
                let api_version = settings
                    .azure_api_version
                    .as_deref()
                    .unwrap_or(DEFAULT_AZURE_API_VERSION);
                let engine = AzureWhisperEngine::new(base_url, deployment, key, api_version);
                Ok(Arc::new(engine))
            }
            TranscriptionProviderSetting::Mock => {
                tracing::warn!("Using mock transcription engine");
                Ok(Arc::new(MockTranscriptionEngine::default()))
            }
        }
    }
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, TranscriptionError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| TranscriptionError::Misconfigured(format!("transcription.{} is required", name)))
}
