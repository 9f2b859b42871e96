pub mod geometry;
pub mod item;
pub mod profile;
pub mod scan;

pub use geometry::{Point2, Size2};
pub use item::{DetectedItem, ItemCategory, Provenance, RawDetection};
pub use profile::{validate_profile_name, Handedness, Profile, Role};
pub use scan::Scan;
