use std::sync::Arc;

use crate::application::services::{JobOrchestrator, ResumeReconciler};
use crate::infrastructure::observability::LogSink;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<JobOrchestrator>,
    pub reconciler: Arc<ResumeReconciler>,
    pub log_sink: LogSink,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<JobOrchestrator>,
        reconciler: Arc<ResumeReconciler>,
        log_sink: LogSink,
    ) -> Self {
        Self {
            orchestrator,
            reconciler,
            log_sink,
        }
    }
}
