use chrono::{DateTime, Utc};
use serde::Serialize;

use super::InterviewId;

/// Interview record owned by the platform; this service only reads it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub id: InterviewId,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Interview {
    pub fn new(id: InterviewId, video_url: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            video_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// A final asset URL means the upload finished.
    pub fn has_final_asset(&self) -> bool {
        self.video_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}
