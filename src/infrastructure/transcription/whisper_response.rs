use serde::Deserialize;

use crate::application::ports::TranscriptionError;
use crate::domain::{Transcript, TranscriptMetadata};

const WEBM_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

/// Whisper picks the decoder from the upload's file name, so name the part
/// after the container we can recognise.
pub(crate) fn media_part_name(media: &[u8]) -> (&'static str, &'static str) {
    if media.starts_with(&WEBM_MAGIC) {
        ("interview.webm", "video/webm")
    } else {
        ("interview.mp4", "video/mp4")
    }
}

/// `response_format=verbose_json` body shared by OpenAI and Azure.
#[derive(Debug, Deserialize)]
pub(crate) struct VerboseTranscription {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    #[serde(default)]
    avg_logprob: Option<f64>,
}

impl VerboseTranscription {
    pub(crate) fn into_transcript(self) -> Result<Transcript, TranscriptionError> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return Err(TranscriptionError::MalformedResponse(
                "response contained no text".to_string(),
            ));
        }

        let mut metadata = TranscriptMetadata::new();
        if let Some(duration) = self.duration {
            metadata.insert("duration", duration);
        }
        if let Some(language) = self.language {
            metadata.insert("language", language);
        }
        if let Some(confidence) = mean_confidence(&self.segments) {
            metadata.insert("confidence", confidence);
        }
        metadata.insert("segments", self.segments.len());

        Ok(Transcript::new(text, metadata))
    }
}

/// Mean per-segment token probability, from Whisper's average log-probabilities.
fn mean_confidence(segments: &[Segment]) -> Option<f64> {
    let probabilities: Vec<f64> = segments
        .iter()
        .filter_map(|s| s.avg_logprob)
        .map(|logprob| logprob.exp().clamp(0.0, 1.0))
        .collect();

    if probabilities.is_empty() {
        None
    } else {
        Some(probabilities.iter().sum::<f64>() / probabilities.len() as f64)
    }
}
