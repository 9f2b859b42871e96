use std::fmt;

use thiserror::Error;

/// Which of the two corner sets a calibration error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointSetKind {
    Reference,
    Desk,
}

impl fmt::Display for PointSetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointSetKind::Reference => f.write_str("reference object"),
            PointSetKind::Desk => f.write_str("desk boundary"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    #[error("{set} needs {required} corners, only {actual} marked")]
    IncompleteCalibration {
        set: PointSetKind,
        actual: usize,
        required: usize,
    },

    #[error("scale has not been computed from the reference object")]
    MissingScale,

    #[error(
        "reference object spans {width_px:.1} x {height_px:.1} px, below the {min_px} px minimum"
    )]
    DegenerateCalibration {
        width_px: f64,
        height_px: f64,
        min_px: f64,
    },

    #[error(
        "reference object spans {width_px:.1} x {height_px:.1} px, above the {max_px} px maximum"
    )]
    UnrealisticCalibration {
        width_px: f64,
        height_px: f64,
        max_px: f64,
    },

    #[error("{set} already has all of its corners")]
    PointSetFull { set: PointSetKind },
}

impl CalibrationError {
    /// True when more input (points or a scale computation) would fix it.
    pub fn is_incomplete(&self) -> bool {
        matches!(
            self,
            CalibrationError::IncompleteCalibration { .. } | CalibrationError::MissingScale
        )
    }
}

/// Non-fatal: the x and y scale estimates disagree more than the configured
/// threshold, which usually means the photo was taken at an angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveDistortionWarning {
    pub scale_x: f64,
    pub scale_y: f64,
    pub relative_difference: f64,
    pub threshold: f64,
}

impl fmt::Display for PerspectiveDistortionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "perspective distortion: x scale {:.2} px/cm vs y scale {:.2} px/cm differ by {:.0}% (limit {:.0}%)",
            self.scale_x,
            self.scale_y,
            self.relative_difference * 100.0,
            self.threshold * 100.0
        )
    }
}
