use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Detect,
    Transform,
    Persist,
    Evaluate,
    Finalize,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Detect => "detect",
            Stage::Transform => "transform",
            Stage::Persist => "persist",
            Stage::Evaluate => "evaluate",
            Stage::Finalize => "finalize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PipelineError {
    #[error("no items were detected in the image")]
    NoItemsFound,

    #[error("object detection failed: {0}")]
    DetectionFailed(String),

    #[error("no detected item could be placed on the desk: {0}")]
    ProcessingFailed(String),

    #[error("failed to save scan: {0}")]
    Persistence(String),

    #[error("rule evaluation failed: {0}")]
    Evaluation(String),
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{stage} stage failed: {error}")]
pub struct StageFailure {
    pub stage: Stage,
    #[source]
    pub error: PipelineError,
}

impl StageFailure {
    pub fn new(stage: Stage, error: PipelineError) -> Self {
        Self { stage, error }
    }

    /// The user can fix these by adjusting the photo or calibration and
    /// running again; everything else is an internal fault.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.error,
            PipelineError::NoItemsFound | PipelineError::ProcessingFailed(_)
        )
    }
}
