use async_trait::async_trait;

use crate::domain::{Interview, InterviewId};

use super::RepositoryError;

#[async_trait]
pub trait InterviewRepository: Send + Sync {
    async fn get_interview(&self, id: &InterviewId) -> Result<Option<Interview>, RepositoryError>;
}
