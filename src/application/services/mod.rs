mod job_orchestrator;
mod resume_reconciler;
mod stale_job_sweeper;

pub use job_orchestrator::{
    JobOrchestrator, JobReport, OrchestratorConfig, OrchestratorError, PipelineError,
    StaleThresholdTooShort,
};
pub use resume_reconciler::{ReconcileError, ResumeDecision, ResumeReconciler};
pub use stale_job_sweeper::StaleJobSweeper;
