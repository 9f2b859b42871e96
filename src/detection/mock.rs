use std::path::Path;

use anyhow::Result;

use crate::models::{ItemCategory, RawDetection};

use super::Detector;

/// Returns the same small desk for every image: a keyboard, a mouse to its
/// right and a monitor behind them. Useful for demos and tests without a
/// model on disk.
#[derive(Debug, Clone, Default)]
pub struct MockDetector;

impl Detector for MockDetector {
    fn name(&self) -> &str {
        "mock"
    }

    fn detect(&self, _image_path: &Path) -> Result<Vec<RawDetection>> {
        Ok(vec![
            RawDetection {
                category: ItemCategory::Keyboard,
                x: 200.0,
                y: 300.0,
                width: 300.0,
                height: 100.0,
                confidence: 0.85,
                rotation: 0.0,
            },
            RawDetection {
                category: ItemCategory::Mouse,
                x: 550.0,
                y: 320.0,
                width: 60.0,
                height: 90.0,
                confidence: 0.78,
                rotation: 0.0,
            },
            RawDetection {
                category: ItemCategory::Monitor,
                x: 400.0,
                y: 150.0,
                width: 400.0,
                height: 250.0,
                confidence: 0.92,
                rotation: 0.0,
            },
        ])
    }
}
