use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{InterviewRepository, RepositoryError};
use crate::domain::{Interview, InterviewId};

/// Interview records seeded by the hosting platform (or tests).
#[derive(Default)]
pub struct InMemoryInterviewRepository {
    interviews: RwLock<HashMap<InterviewId, Interview>>,
}

impl InMemoryInterviewRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert(&self, interview: Interview) {
        self.interviews
            .write()
            .await
            .insert(interview.id.clone(), interview);
    }
}

#[async_trait]
impl InterviewRepository for InMemoryInterviewRepository {
    async fn get_interview(&self, id: &InterviewId) -> Result<Option<Interview>, RepositoryError> {
        Ok(self.interviews.read().await.get(id).cloned())
    }
}
