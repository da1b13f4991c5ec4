use crate::errors::PipelineStage;

/// Receives advisory stage notifications from the orchestrator.
///
/// Notifications carry no contract beyond "stage has started/finished".
pub trait ProgressReporter: Send + Sync {
    fn stage_started(&self, _stage: PipelineStage) {}

    fn stage_finished(&self, _stage: PipelineStage) {}
}

/// Reporter that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}
