use serde::Serialize;

use crate::models::{Point2, Size2};
use crate::settings::CalibrationSettings;

use super::error::{CalibrationError, PerspectiveDistortionWarning, PointSetKind};
use super::points::{CollectionState, CornerSet, Quad};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Outcome of a successful scale computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleEstimate {
    /// Pixels per centimeter, mean of the two axis estimates.
    pub scale: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub width_px: f64,
    pub height_px: f64,
    pub distortion: Option<PerspectiveDistortionWarning>,
}

/// Calibration state for one analysed photo: reference-object corners, desk
/// corners and the derived pixels-per-centimeter scale.
///
/// The desk frame has its origin at the centroid of the four desk corners
/// and is scaled isotropically by the single averaged scale. No perspective
/// rectification is attempted.
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    settings: CalibrationSettings,
    reference: CornerSet,
    desk: CornerSet,
    scale: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationStatus {
    pub reference: CollectionState,
    pub desk: CollectionState,
    pub scale: Option<f64>,
}

impl Default for CalibrationSession {
    fn default() -> Self {
        Self::new(CalibrationSettings::default())
    }
}

impl CalibrationSession {
    pub fn new(settings: CalibrationSettings) -> Self {
        Self {
            settings,
            reference: CornerSet::new(PointSetKind::Reference),
            desk: CornerSet::new(PointSetKind::Desk),
            scale: None,
        }
    }

    pub fn add_calibration_point(&mut self, x: f64, y: f64) -> Result<usize, CalibrationError> {
        self.reference.push(Point2::new(x, y))
    }

    pub fn add_desk_corner(&mut self, x: f64, y: f64) -> Result<usize, CalibrationError> {
        self.desk.push(Point2::new(x, y))
    }

    pub fn calibration_points(&self) -> &[Point2] {
        self.reference.points()
    }

    pub fn desk_corners(&self) -> &[Point2] {
        self.desk.points()
    }

    pub fn is_calibration_complete(&self) -> bool {
        self.reference.is_complete()
    }

    pub fn is_desk_complete(&self) -> bool {
        self.desk.is_complete()
    }

    pub fn scale(&self) -> Option<f64> {
        self.scale
    }

    pub fn status(&self) -> CalibrationStatus {
        CalibrationStatus {
            reference: self.reference.state(),
            desk: self.desk.state(),
            scale: self.scale,
        }
    }

    /// Derive pixels-per-centimeter from the four reference corners.
    ///
    /// A reference object that is implausibly small or large, or has a
    /// non-finite extent, clears the reference corners and any previous
    /// scale so the user can re-pick.
    pub fn compute_scale(&mut self) -> Result<ScaleEstimate, CalibrationError> {
        let quad = self.reference.quad()?;
        let width_px = quad.mean_width();
        let height_px = quad.mean_height();

        let min_px = self.settings.min_calibration_pixels;
        let max_px = self.settings.max_calibration_pixels;

        if !width_px.is_finite()
            || !height_px.is_finite()
            || width_px < min_px
            || height_px < min_px
        {
            self.invalidate_reference();
            return Err(CalibrationError::DegenerateCalibration {
                width_px,
                height_px,
                min_px,
            });
        }
        if width_px > max_px || height_px > max_px {
            self.invalidate_reference();
            return Err(CalibrationError::UnrealisticCalibration {
                width_px,
                height_px,
                max_px,
            });
        }

        let scale_x = width_px / self.settings.reference_width_cm;
        let scale_y = height_px / self.settings.reference_height_cm;
        let relative_difference = (scale_x - scale_y).abs() / scale_x.max(scale_y);

        let distortion = (relative_difference > self.settings.max_perspective_distortion).then(|| {
            PerspectiveDistortionWarning {
                scale_x,
                scale_y,
                relative_difference,
                threshold: self.settings.max_perspective_distortion,
            }
        });
        if let Some(warning) = &distortion {
            log_warn!("{warning}; calibration continues with the averaged scale");
        }

        let scale = (scale_x + scale_y) / 2.0;
        self.scale = Some(scale);
        log_info!(
            "Calibrated reference object {:.1}x{:.1} px -> {:.3} px/cm",
            width_px,
            height_px,
            scale
        );

        Ok(ScaleEstimate {
            scale,
            scale_x,
            scale_y,
            width_px,
            height_px,
            distortion,
        })
    }

    pub fn pixels_to_units(&self, pixels: f64) -> Option<f64> {
        self.scale.map(|scale| pixels / scale)
    }

    pub fn units_to_pixels(&self, units: f64) -> Option<f64> {
        self.scale.map(|scale| units * scale)
    }

    pub fn desk_center(&self) -> Result<Point2, CalibrationError> {
        Ok(self.desk.quad()?.centroid())
    }

    /// Pixel point -> centimeters relative to the desk centroid.
    pub fn transform_to_desk_frame(&self, x: f64, y: f64) -> Result<Point2, CalibrationError> {
        let (quad, scale) = self.desk_frame()?;
        let center = quad.centroid();
        Ok(Point2::new((x - center.x) / scale, (y - center.y) / scale))
    }

    /// Desk-frame centimeters -> pixel point. Inverse of
    /// [`transform_to_desk_frame`](Self::transform_to_desk_frame).
    pub fn desk_frame_to_pixels(&self, point: Point2) -> Result<Point2, CalibrationError> {
        let (quad, scale) = self.desk_frame()?;
        Ok(quad.centroid() + point.scaled(scale))
    }

    /// Desk width (top edge) and height (left edge) in centimeters.
    pub fn desk_dimensions(&self) -> Result<Size2, CalibrationError> {
        let (quad, scale) = self.desk_frame()?;
        Ok(Size2::new(quad.top_edge() / scale, quad.left_edge() / scale))
    }

    /// Desk corners as a JSON list of `[x, y]` pairs, for storage.
    pub fn desk_bounds_json(&self) -> String {
        let pairs: Vec<[f64; 2]> = self.desk.points().iter().map(|p| p.to_pair()).collect();
        serde_json::json!(pairs).to_string()
    }

    pub fn reset(&mut self) {
        self.reference.clear();
        self.desk.clear();
        self.scale = None;
    }

    fn desk_frame(&self) -> Result<(Quad, f64), CalibrationError> {
        let quad = self.desk.quad()?;
        let scale = self.scale.ok_or(CalibrationError::MissingScale)?;
        Ok((quad, scale))
    }

    fn invalidate_reference(&mut self) {
        self.reference.clear();
        self.scale = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rectangle(session: &mut CalibrationSession, x: f64, y: f64, w: f64, h: f64) {
        session.add_calibration_point(x, y).unwrap();
        session.add_calibration_point(x + w, y).unwrap();
        session.add_calibration_point(x + w, y + h).unwrap();
        session.add_calibration_point(x, y + h).unwrap();
    }

    fn desk(session: &mut CalibrationSession, corners: [(f64, f64); 4]) {
        for (x, y) in corners {
            session.add_desk_corner(x, y).unwrap();
        }
    }

    #[test]
    fn rectangle_scale_is_mean_of_axis_ratios() {
        for (w, h) in [(85.0, 54.0), (170.0, 100.0), (300.0, 220.0)] {
            let mut session = CalibrationSession::default();
            rectangle(&mut session, 40.0, 60.0, w, h);
            let estimate = session.compute_scale().unwrap();
            let expected = (w / 8.5 + h / 5.4) / 2.0;
            assert!((estimate.scale - expected).abs() < 1e-9);
            assert_eq!(session.scale(), Some(estimate.scale));
        }
    }

    #[test]
    fn card_at_ten_pixels_per_cm() {
        let mut session = CalibrationSession::default();
        rectangle(&mut session, 0.0, 0.0, 85.0, 54.0);
        let estimate = session.compute_scale().unwrap();
        assert!((estimate.scale - 10.0).abs() < 1e-9);
        assert!(estimate.distortion.is_none());
    }

    #[test]
    fn compute_scale_requires_four_points() {
        let mut session = CalibrationSession::default();
        session.add_calibration_point(0.0, 0.0).unwrap();
        session.add_calibration_point(85.0, 0.0).unwrap();
        let err = session.compute_scale().unwrap_err();
        assert!(matches!(
            err,
            CalibrationError::IncompleteCalibration { actual: 2, required: 4, .. }
        ));
        assert_eq!(session.scale(), None);
    }

    #[test]
    fn tiny_reference_is_degenerate_and_clears_state() {
        let mut session = CalibrationSession::default();
        rectangle(&mut session, 0.0, 0.0, 5.0, 54.0);
        let err = session.compute_scale().unwrap_err();
        assert!(matches!(err, CalibrationError::DegenerateCalibration { .. }));
        assert_eq!(session.scale(), None);
        assert!(session.calibration_points().is_empty());
        // The user can pick again once cleared.
        rectangle(&mut session, 0.0, 0.0, 85.0, 54.0);
        assert!(session.compute_scale().is_ok());
    }

    #[test]
    fn non_finite_reference_is_degenerate() {
        let mut session = CalibrationSession::default();
        rectangle(&mut session, f64::NAN, 0.0, 85.0, 54.0);
        let err = session.compute_scale().unwrap_err();
        assert!(matches!(err, CalibrationError::DegenerateCalibration { .. }));
        assert_eq!(session.scale(), None);
        assert!(session.calibration_points().is_empty());
    }

    #[test]
    fn huge_reference_is_unrealistic() {
        let mut session = CalibrationSession::default();
        rectangle(&mut session, 0.0, 0.0, 12_000.0, 54.0);
        let err = session.compute_scale().unwrap_err();
        assert!(matches!(err, CalibrationError::UnrealisticCalibration { .. }));
        assert_eq!(session.scale(), None);
    }

    #[test]
    fn failed_recalibration_drops_previous_scale() {
        let mut session = CalibrationSession::default();
        rectangle(&mut session, 0.0, 0.0, 85.0, 54.0);
        session.compute_scale().unwrap();
        session.reset();
        rectangle(&mut session, 0.0, 0.0, 3.0, 3.0);
        assert!(session.compute_scale().is_err());
        assert_eq!(session.scale(), None);
    }

    #[test]
    fn skewed_card_warns_but_still_calibrates() {
        let mut session = CalibrationSession::default();
        // x: 85/8.5 = 10 px/cm, y: 27/5.4 = 5 px/cm
        rectangle(&mut session, 0.0, 0.0, 85.0, 27.0);
        let estimate = session.compute_scale().unwrap();
        let warning = estimate.distortion.expect("distortion warning");
        assert!((warning.relative_difference - 0.5).abs() < 1e-9);
        assert!((estimate.scale - 7.5).abs() < 1e-9);
    }

    #[test]
    fn unit_conversion_round_trips() {
        let mut session = CalibrationSession::default();
        assert_eq!(session.pixels_to_units(100.0), None);
        assert_eq!(session.units_to_pixels(10.0), None);

        rectangle(&mut session, 10.0, 10.0, 120.0, 70.0);
        session.compute_scale().unwrap();
        for v in [0.0, 1.0, 37.25, -12.5, 1e4] {
            let back = session.pixels_to_units(session.units_to_pixels(v).unwrap()).unwrap();
            assert!((back - v).abs() < 1e-9 * v.abs().max(1.0));
        }
    }

    #[test]
    fn desk_centroid_maps_to_origin() {
        let quads = [
            [(100.0, 100.0), (1300.0, 100.0), (1300.0, 700.0), (100.0, 700.0)],
            [(50.0, 80.0), (900.0, 40.0), (960.0, 610.0), (20.0, 650.0)],
        ];
        for corners in quads {
            let mut session = CalibrationSession::default();
            rectangle(&mut session, 0.0, 0.0, 85.0, 54.0);
            session.compute_scale().unwrap();
            desk(&mut session, corners);
            let center = session.desk_center().unwrap();
            let p = session.transform_to_desk_frame(center.x, center.y).unwrap();
            assert!(p.x.abs() < 1e-9 && p.y.abs() < 1e-9);
        }
    }

    #[test]
    fn transform_needs_desk_and_scale() {
        let mut session = CalibrationSession::default();
        desk(
            &mut session,
            [(0.0, 0.0), (100.0, 0.0), (100.0, 50.0), (0.0, 50.0)],
        );
        assert_eq!(
            session.transform_to_desk_frame(1.0, 1.0),
            Err(CalibrationError::MissingScale)
        );

        let mut session = CalibrationSession::default();
        rectangle(&mut session, 0.0, 0.0, 85.0, 54.0);
        session.compute_scale().unwrap();
        assert!(session
            .transform_to_desk_frame(1.0, 1.0)
            .unwrap_err()
            .is_incomplete());
    }

    #[test]
    fn desk_frame_inverse_recovers_pixels() {
        let mut session = CalibrationSession::default();
        rectangle(&mut session, 0.0, 0.0, 85.0, 54.0);
        session.compute_scale().unwrap();
        desk(
            &mut session,
            [(100.0, 100.0), (1300.0, 100.0), (1300.0, 700.0), (100.0, 700.0)],
        );
        let cm = session.transform_to_desk_frame(450.0, 220.0).unwrap();
        assert!((cm.x - -25.0).abs() < 1e-9 && (cm.y - -18.0).abs() < 1e-9);
        let px = session.desk_frame_to_pixels(cm).unwrap();
        assert!((px.x - 450.0).abs() < 1e-9 && (px.y - 220.0).abs() < 1e-9);
    }

    #[test]
    fn desk_dimensions_use_top_and_left_edges() {
        let mut session = CalibrationSession::default();
        rectangle(&mut session, 0.0, 0.0, 85.0, 54.0);
        session.compute_scale().unwrap();
        desk(
            &mut session,
            [(100.0, 100.0), (1300.0, 100.0), (1300.0, 700.0), (100.0, 700.0)],
        );
        let size = session.desk_dimensions().unwrap();
        assert!((size.width - 120.0).abs() < 1e-9);
        assert!((size.height - 60.0).abs() < 1e-9);
    }

    #[test]
    fn desk_bounds_serialize_as_pairs() {
        let mut session = CalibrationSession::default();
        desk(
            &mut session,
            [(1.0, 2.0), (3.0, 4.0), (5.5, 6.0), (7.0, 8.0)],
        );
        assert_eq!(
            session.desk_bounds_json(),
            "[[1.0,2.0],[3.0,4.0],[5.5,6.0],[7.0,8.0]]"
        );
    }

    #[test]
    fn reset_clears_everything() {
        let mut session = CalibrationSession::default();
        rectangle(&mut session, 0.0, 0.0, 85.0, 54.0);
        session.compute_scale().unwrap();
        desk(
            &mut session,
            [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
        );
        session.reset();
        let status = session.status();
        assert_eq!(status.reference, CollectionState::Empty);
        assert_eq!(status.desk, CollectionState::Empty);
        assert_eq!(status.scale, None);
    }
}
