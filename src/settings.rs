//! Tunable constants for calibration, detection and scoring, persisted as
//! JSON next to the database.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::ergonomics::{Priority, ScoreRating};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    /// Reference object size; defaults to a standard ID-1 card.
    pub reference_width_cm: f64,
    pub reference_height_cm: f64,
    pub min_calibration_pixels: f64,
    pub max_calibration_pixels: f64,
    /// Largest tolerated relative gap between the x and y scale estimates.
    pub max_perspective_distortion: f64,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            reference_width_cm: 8.5,
            reference_height_cm: 5.4,
            min_calibration_pixels: 10.0,
            max_calibration_pixels: 10_000.0,
            max_perspective_distortion: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Same-category detections closer than this (pixels) are duplicates.
    pub dedup_distance_px: f64,
    pub detection_timeout_secs: u64,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            dedup_distance_px: 100.0,
            detection_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub priority_1_penalty: f64,
    pub priority_2_penalty: f64,
    pub priority_3_penalty: f64,
    pub excellent_threshold: f64,
    pub good_threshold: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            priority_1_penalty: 60.0,
            priority_2_penalty: 40.0,
            priority_3_penalty: 20.0,
            excellent_threshold: 80.0,
            good_threshold: 60.0,
        }
    }
}

impl ScoringSettings {
    pub fn penalty_for(&self, priority: Priority) -> f64 {
        match priority {
            Priority::High => self.priority_1_penalty,
            Priority::Medium => self.priority_2_penalty,
            Priority::Low => self.priority_3_penalty,
        }
    }

    pub fn rating(&self, score: f64) -> ScoreRating {
        if score >= self.excellent_threshold {
            ScoreRating::Excellent
        } else if score >= self.good_threshold {
            ScoreRating::Good
        } else {
            ScoreRating::Poor
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub calibration: CalibrationSettings,
    pub detection: DetectionSettings,
    pub scoring: ScoringSettings,
}

impl AnalysisSettings {
    pub fn validate(&self) -> Result<()> {
        let calibration = &self.calibration;
        if calibration.reference_width_cm <= 0.0 || calibration.reference_height_cm <= 0.0 {
            bail!("reference object dimensions must be positive");
        }
        if calibration.min_calibration_pixels <= 0.0
            || calibration.min_calibration_pixels >= calibration.max_calibration_pixels
        {
            bail!(
                "calibration pixel bounds are inverted ({} .. {})",
                calibration.min_calibration_pixels,
                calibration.max_calibration_pixels
            );
        }
        if calibration.max_perspective_distortion < 0.0 {
            bail!("perspective distortion threshold cannot be negative");
        }
        if self.detection.dedup_distance_px < 0.0 {
            bail!("dedup distance cannot be negative");
        }
        if self.detection.detection_timeout_secs == 0 {
            bail!("detection timeout must be at least one second");
        }
        let scoring = &self.scoring;
        if [
            scoring.priority_1_penalty,
            scoring.priority_2_penalty,
            scoring.priority_3_penalty,
        ]
        .iter()
        .any(|penalty| *penalty <= 0.0)
        {
            bail!("priority penalties must be positive");
        }
        if scoring.good_threshold > scoring.excellent_threshold {
            bail!("score 'good' threshold exceeds the 'excellent' threshold");
        }
        Ok(())
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<AnalysisSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            parse_settings(&contents).unwrap_or_else(|err| {
                log_warn!(
                    "Ignoring settings at {} ({err:#}); using defaults",
                    path.display()
                );
                AnalysisSettings::default()
            })
        } else {
            AnalysisSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn analysis(&self) -> AnalysisSettings {
        self.read().clone()
    }

    pub fn update_analysis(&self, settings: AnalysisSettings) -> Result<()> {
        settings.validate()?;
        let mut guard = self.write();
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    fn persist(&self, data: &AnalysisSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, AnalysisSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AnalysisSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn parse_settings(contents: &str) -> Result<AnalysisSettings> {
    let settings: AnalysisSettings =
        serde_json::from_str(contents).context("settings file is not valid JSON")?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_settings_path() -> PathBuf {
        std::env::temp_dir().join(format!("deskopt-settings-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let store = SettingsStore::new(temp_settings_path()).unwrap();
        let settings = store.analysis();
        assert_eq!(settings.calibration.reference_width_cm, 8.5);
        assert_eq!(settings.detection.dedup_distance_px, 100.0);
        assert_eq!(settings.scoring.priority_1_penalty, 60.0);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = temp_settings_path();
        fs::write(&path, r#"{"scoring": {"priority_3_penalty": 10.0}}"#).unwrap();
        let store = SettingsStore::new(path.clone()).unwrap();
        let settings = store.analysis();
        assert_eq!(settings.scoring.priority_3_penalty, 10.0);
        assert_eq!(settings.scoring.priority_2_penalty, 40.0);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn invalid_updates_are_rejected_and_valid_ones_persist() {
        let path = temp_settings_path();
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut bad = store.analysis();
        bad.calibration.min_calibration_pixels = 20_000.0;
        assert!(store.update_analysis(bad).is_err());

        let mut good = store.analysis();
        good.detection.dedup_distance_px = 42.0;
        store.update_analysis(good).unwrap();

        let reopened = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(reopened.analysis().detection.dedup_distance_px, 42.0);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rating_bands_follow_thresholds() {
        let scoring = ScoringSettings::default();
        assert_eq!(scoring.rating(80.0), ScoreRating::Excellent);
        assert_eq!(scoring.rating(79.9), ScoreRating::Good);
        assert_eq!(scoring.rating(59.9), ScoreRating::Poor);
    }
}
