use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ergonomics::AnalysisResult;
use crate::models::{DetectedItem, Size2};
use crate::overlay::Overlay;

use super::error::{Stage, StageFailure};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub run_id: String,
    pub stage: Stage,
    pub percent: u8,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub run_id: String,
    pub scan_id: i64,
    /// Deduplicated items in desk-frame centimeters.
    pub items: Vec<DetectedItem>,
    pub result: AnalysisResult,
    /// Overlay in desk-frame centimeters.
    pub overlay: Overlay,
    /// The same overlay mapped onto the photo, when the desk frame allows it.
    pub image_overlay: Option<Overlay>,
    pub desk_dimensions: Option<Size2>,
    pub completed_at: DateTime<Utc>,
}

/// Everything a run reports to its listener. A run that is not cancelled
/// ends with exactly one `Completed` or `Failed`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisEvent {
    Progress(ProgressUpdate),
    Completed(Box<AnalysisReport>),
    Failed { run_id: String, failure: StageFailure },
}

impl AnalysisEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AnalysisEvent::Progress(_))
    }
}
