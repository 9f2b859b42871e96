pub mod error;
pub mod points;
pub mod session;

pub use error::{CalibrationError, PerspectiveDistortionWarning, PointSetKind};
pub use points::{CollectionState, CornerSet, Quad, CORNER_COUNT};
pub use session::{CalibrationSession, CalibrationStatus, ScaleEstimate};
