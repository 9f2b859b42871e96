//! Object detection boundary.
//!
//! The detection model itself lives outside this crate; anything that can
//! turn an image path into candidate items implements [`Detector`].

pub mod dedup;
pub mod mock;
pub mod sidecar;

use std::path::Path;

use anyhow::Result;

use crate::models::RawDetection;

pub use dedup::deduplicate;
pub use mock::MockDetector;
pub use sidecar::SidecarDetector;

/// Produces candidate desk items for an image.
///
/// Implementations are called from the blocking thread pool and may take
/// seconds. Confidence thresholding is the implementation's job; callers use
/// every returned candidate.
pub trait Detector: Send + Sync {
    fn name(&self) -> &str;

    fn detect(&self, image_path: &Path) -> Result<Vec<RawDetection>>;
}
