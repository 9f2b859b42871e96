//! One analysis run: detect, dedupe, transform, persist, evaluate, project.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::calibration::CalibrationSession;
use crate::db::Database;
use crate::detection::{deduplicate, Detector};
use crate::ergonomics::{analyze, ErgonomicRule};
use crate::models::{DetectedItem, Handedness, RawDetection, Size2};
use crate::overlay::project;
use crate::settings::AnalysisSettings;

use super::error::{PipelineError, Stage, StageFailure};
use super::events::{AnalysisEvent, AnalysisReport, ProgressUpdate};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Inputs of a run. Calibration and rules are snapshots; later edits to the
/// originals do not affect a run in flight.
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    pub run_id: String,
    pub image_path: PathBuf,
    pub profile_id: Option<i64>,
    pub handedness: Handedness,
    pub calibration: CalibrationSession,
    pub rules: Vec<ErgonomicRule>,
    pub settings: AnalysisSettings,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(Box<AnalysisReport>),
    Failed(StageFailure),
    Cancelled,
}

/// Sends progress that never goes backwards.
struct ProgressReporter {
    run_id: String,
    events: mpsc::Sender<AnalysisEvent>,
    last_percent: u8,
}

impl ProgressReporter {
    async fn report(&mut self, stage: Stage, percent: u8, message: impl Into<String>) {
        let percent = percent.clamp(self.last_percent, 100);
        self.last_percent = percent;
        self.send(AnalysisEvent::Progress(ProgressUpdate {
            run_id: self.run_id.clone(),
            stage,
            percent,
            message: message.into(),
        }))
        .await;
    }

    async fn send(&self, event: AnalysisEvent) {
        if self.events.send(event).await.is_err() {
            log_debug!("analysis {} listener dropped; event discarded", self.run_id);
        }
    }
}

pub async fn run_analysis(
    job: AnalysisJob,
    detector: Arc<dyn Detector>,
    db: Database,
    events: mpsc::Sender<AnalysisEvent>,
    cancel_token: CancellationToken,
) -> RunOutcome {
    let mut reporter = ProgressReporter {
        run_id: job.run_id.clone(),
        events,
        last_percent: 0,
    };

    let outcome = run_stages(&job, detector, &db, &mut reporter, &cancel_token).await;

    match &outcome {
        RunOutcome::Completed(report) => {
            log_info!(
                "analysis {} completed: scan {}, score {}",
                job.run_id,
                report.scan_id,
                report.result.score
            );
            reporter
                .send(AnalysisEvent::Completed(report.clone()))
                .await;
        }
        RunOutcome::Failed(failure) => {
            if failure.is_recoverable() {
                log_warn!("analysis {} stopped: {failure}", job.run_id);
            } else {
                log_error!("analysis {} failed: {failure}", job.run_id);
            }
            reporter
                .send(AnalysisEvent::Failed {
                    run_id: job.run_id.clone(),
                    failure: failure.clone(),
                })
                .await;
        }
        RunOutcome::Cancelled => {
            log_info!("analysis {} cancelled", job.run_id);
        }
    }

    outcome
}

macro_rules! bail_if_cancelled {
    ($token:expr) => {
        if $token.is_cancelled() {
            return RunOutcome::Cancelled;
        }
    };
}

async fn run_stages(
    job: &AnalysisJob,
    detector: Arc<dyn Detector>,
    db: &Database,
    reporter: &mut ProgressReporter,
    cancel_token: &CancellationToken,
) -> RunOutcome {
    bail_if_cancelled!(cancel_token);
    reporter
        .report(Stage::Detect, 10, format!("Detecting items with {}", detector.name()))
        .await;
    let timeout = Duration::from_secs(job.settings.detection.detection_timeout_secs);
    let detections = tokio::select! {
        biased;
        _ = cancel_token.cancelled() => return RunOutcome::Cancelled,
        result = detect(detector, job.image_path.clone(), timeout) => match result {
            Ok(detections) => detections,
            Err(error) => return RunOutcome::Failed(StageFailure::new(Stage::Detect, error)),
        },
    };
    if detections.is_empty() {
        return RunOutcome::Failed(StageFailure::new(
            Stage::Detect,
            PipelineError::NoItemsFound,
        ));
    }
    reporter
        .report(Stage::Detect, 40, format!("Detected {} candidates", detections.len()))
        .await;

    bail_if_cancelled!(cancel_token);
    reporter
        .report(Stage::Transform, 50, "Removing duplicates and mapping to the desk")
        .await;
    let candidates: Vec<DetectedItem> = detections.iter().map(DetectedItem::from_detection).collect();
    let unique = deduplicate(candidates, job.settings.detection.dedup_distance_px);
    let items = match to_desk_frame(&job.calibration, unique) {
        Ok(items) => items,
        Err(error) => return RunOutcome::Failed(StageFailure::new(Stage::Transform, error)),
    };
    reporter
        .report(Stage::Transform, 60, format!("{} items on the desk", items.len()))
        .await;

    bail_if_cancelled!(cancel_token);
    reporter.report(Stage::Persist, 70, "Saving scan").await;
    let desk_bounds = job
        .calibration
        .is_desk_complete()
        .then(|| job.calibration.desk_bounds_json());
    let scan_id = match db
        .save_scan_with_items(
            job.profile_id,
            job.image_path.to_string_lossy().into_owned(),
            job.calibration.scale(),
            desk_bounds,
            items.clone(),
        )
        .await
    {
        Ok(scan_id) => scan_id,
        Err(err) => {
            return RunOutcome::Failed(StageFailure::new(
                Stage::Persist,
                PipelineError::Persistence(format!("{err:#}")),
            ))
        }
    };
    reporter
        .report(Stage::Persist, 75, format!("Saved scan {scan_id}"))
        .await;

    bail_if_cancelled!(cancel_token);
    reporter.report(Stage::Evaluate, 80, "Checking placement rules").await;
    let rules = job.rules.clone();
    let handedness = job.handedness;
    let scoring = job.settings.scoring.clone();
    let evaluated_items = items.clone();
    let result = match tokio::task::spawn_blocking(move || {
        analyze(&evaluated_items, &rules, handedness, &scoring)
    })
    .await
    {
        Ok(result) => result,
        Err(err) => {
            return RunOutcome::Failed(StageFailure::new(
                Stage::Evaluate,
                PipelineError::Evaluation(err.to_string()),
            ))
        }
    };
    reporter
        .report(
            Stage::Evaluate,
            95,
            format!("{} recommendations", result.recommendations.len()),
        )
        .await;

    bail_if_cancelled!(cancel_token);
    let overlay = project(&result.recommendations);
    let image_overlay = match overlay.to_image_space(&job.calibration) {
        Ok(image_overlay) => Some(image_overlay),
        Err(err) => {
            log_warn!("overlay left in desk coordinates: {err}");
            None
        }
    };
    let report = AnalysisReport {
        run_id: job.run_id.clone(),
        scan_id,
        items,
        result,
        overlay,
        image_overlay,
        desk_dimensions: job.calibration.desk_dimensions().ok(),
        completed_at: Utc::now(),
    };
    reporter.report(Stage::Finalize, 100, "Analysis complete").await;

    RunOutcome::Completed(Box::new(report))
}

/// The detector runs on the blocking pool and is abandoned after `timeout`.
async fn detect(
    detector: Arc<dyn Detector>,
    image_path: PathBuf,
    timeout: Duration,
) -> Result<Vec<RawDetection>, PipelineError> {
    let task = tokio::task::spawn_blocking(move || detector.detect(&image_path));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(Ok(detections))) => Ok(detections),
        Ok(Ok(Err(err))) => Err(PipelineError::DetectionFailed(format!("{err:#}"))),
        Ok(Err(join_err)) => Err(PipelineError::DetectionFailed(format!(
            "detector task failed: {join_err}"
        ))),
        Err(_) => Err(PipelineError::DetectionFailed(format!(
            "timed out after {}s",
            timeout.as_secs()
        ))),
    }
}

/// Pixel items to desk-frame centimeters. Items that cannot be placed are
/// skipped; if none can, the reason for the first failure is reported.
fn to_desk_frame(
    calibration: &CalibrationSession,
    items: Vec<DetectedItem>,
) -> Result<Vec<DetectedItem>, PipelineError> {
    let mut placed = Vec::with_capacity(items.len());
    let mut first_error = None;

    for item in items {
        let center = match calibration.transform_to_desk_frame(item.center.x, item.center.y) {
            Ok(center) => center,
            Err(err) => {
                log_debug!("skipping {} {}: {err}", item.category, item.id);
                first_error.get_or_insert(err);
                continue;
            }
        };
        let width = calibration.pixels_to_units(item.size.width);
        let height = calibration.pixels_to_units(item.size.height);
        let (Some(width), Some(height)) = (width, height) else {
            continue;
        };
        placed.push(DetectedItem {
            center,
            size: Size2::new(width, height),
            ..item
        });
    }

    if placed.is_empty() {
        let reason = first_error
            .map(|err| err.to_string())
            .unwrap_or_else(|| "no candidates left after deduplication".to_string());
        return Err(PipelineError::ProcessingFailed(reason));
    }
    Ok(placed)
}
