use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::calibration::CalibrationSession;
use crate::db::Database;
use crate::detection::Detector;
use crate::models::{Handedness, Role};
use crate::settings::AnalysisSettings;

use super::events::AnalysisEvent;
use super::pipeline::{run_analysis, AnalysisJob, RunOutcome};

const ENABLE_LOGS: bool = true;

use crate::log_info;

const EVENT_CHANNEL_CAPACITY: usize = 32;

/// What the caller wants analysed.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub image_path: PathBuf,
    pub profile_id: Option<i64>,
    pub role: Role,
    pub handedness: Handedness,
    pub calibration: CalibrationSession,
}

/// Owns the single in-flight analysis run.
pub struct AnalysisController {
    detector: Arc<dyn Detector>,
    db: Database,
    handle: Option<JoinHandle<RunOutcome>>,
    cancel_token: Option<CancellationToken>,
}

impl AnalysisController {
    pub fn new(detector: Arc<dyn Detector>, db: Database) -> Self {
        Self {
            detector,
            db,
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Start a run and return its event stream. Fails if a run is already in
    /// flight; runs are never queued.
    pub async fn start(
        &mut self,
        request: AnalysisRequest,
        settings: AnalysisSettings,
    ) -> Result<mpsc::Receiver<AnalysisEvent>> {
        if self.is_running() {
            bail!("analysis already running");
        }

        let rules = self
            .db
            .rules_for_role(request.role.as_str())
            .await
            .context("failed to load rules for analysis")?;

        let job = AnalysisJob {
            run_id: Uuid::new_v4().to_string(),
            image_path: request.image_path,
            profile_id: request.profile_id,
            handedness: request.handedness,
            calibration: request.calibration,
            rules,
            settings,
        };
        log_info!(
            "starting analysis {} of {} ({} rules)",
            job.run_id,
            job.image_path.display(),
            job.rules.len()
        );

        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(run_analysis(
            job,
            Arc::clone(&self.detector),
            self.db.clone(),
            events_tx,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(events_rx)
    }

    /// Request cancellation. The run stops at its next stage boundary.
    pub fn cancel(&self) {
        if let Some(token) = &self.cancel_token {
            token.cancel();
        }
    }

    /// Wait for the current run to finish. Returns `None` when nothing was
    /// started.
    pub async fn wait(&mut self) -> Result<Option<RunOutcome>> {
        self.cancel_token = None;
        match self.handle.take() {
            Some(handle) => handle
                .await
                .context("analysis task failed to join")
                .map(Some),
            None => Ok(None),
        }
    }
}
