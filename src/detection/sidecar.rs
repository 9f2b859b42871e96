//! Detections exported by an external model run, read from a JSON file that
//! sits next to the image (`desk.jpg` -> `desk.detections.json`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::{ItemCategory, RawDetection};

use super::Detector;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

#[derive(Debug, Deserialize)]
struct SidecarEntry {
    /// Raw class label from the model, or a desk category slug.
    label: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    confidence: f64,
    #[serde(default)]
    rotation: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SidecarDetector {
    path_override: Option<PathBuf>,
}

impl SidecarDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read detections from `path` regardless of the image analysed.
    pub fn from_file(path: PathBuf) -> Self {
        Self {
            path_override: Some(path),
        }
    }

    pub fn sidecar_path(&self, image_path: &Path) -> PathBuf {
        self.path_override
            .clone()
            .unwrap_or_else(|| image_path.with_extension("detections.json"))
    }
}

impl Detector for SidecarDetector {
    fn name(&self) -> &str {
        "sidecar"
    }

    fn detect(&self, image_path: &Path) -> Result<Vec<RawDetection>> {
        let path = self.sidecar_path(image_path);
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read detections from {}", path.display()))?;
        let entries: Vec<SidecarEntry> = serde_json::from_str(&contents)
            .with_context(|| format!("invalid detections file {}", path.display()))?;

        let total = entries.len();
        let detections: Vec<RawDetection> = entries
            .into_iter()
            .filter_map(|entry| {
                let category = ItemCategory::from_detector_class(&entry.label)
                    .or_else(|| entry.label.parse().ok());
                if category.is_none() {
                    log_debug!("dropping detection with unmapped label '{}'", entry.label);
                }
                category.map(|category| RawDetection {
                    category,
                    x: entry.x,
                    y: entry.y,
                    width: entry.width,
                    height: entry.height,
                    confidence: entry.confidence,
                    rotation: entry.rotation,
                })
            })
            .collect();

        log_info!(
            "Loaded {} of {} detections from {}",
            detections.len(),
            total,
            path.display()
        );
        Ok(detections)
    }
}
