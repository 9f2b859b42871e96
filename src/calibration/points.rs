//! Four-corner point collection.
//!
//! Corners are always interpreted in click order
//! top-left, top-right, bottom-right, bottom-left.

use serde::Serialize;

use crate::models::Point2;

use super::error::{CalibrationError, PointSetKind};

pub const CORNER_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "count", rename_all = "camelCase")]
pub enum CollectionState {
    Empty,
    Collecting(usize),
    Complete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CornerSet {
    kind: PointSetKind,
    points: Vec<Point2>,
}

impl CornerSet {
    pub fn new(kind: PointSetKind) -> Self {
        Self {
            kind,
            points: Vec::with_capacity(CORNER_COUNT),
        }
    }

    pub fn state(&self) -> CollectionState {
        match self.points.len() {
            0 => CollectionState::Empty,
            n if n < CORNER_COUNT => CollectionState::Collecting(n),
            _ => CollectionState::Complete,
        }
    }

    /// Append a corner and return the new count. A complete set rejects
    /// further points instead of growing past four.
    pub fn push(&mut self, point: Point2) -> Result<usize, CalibrationError> {
        if self.state() == CollectionState::Complete {
            return Err(CalibrationError::PointSetFull { set: self.kind });
        }
        self.points.push(point);
        Ok(self.points.len())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.state() == CollectionState::Complete
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn quad(&self) -> Result<Quad, CalibrationError> {
        match self.points.as_slice() {
            [top_left, top_right, bottom_right, bottom_left] => Ok(Quad {
                top_left: *top_left,
                top_right: *top_right,
                bottom_right: *bottom_right,
                bottom_left: *bottom_left,
            }),
            _ => Err(CalibrationError::IncompleteCalibration {
                set: self.kind,
                actual: self.points.len(),
                required: CORNER_COUNT,
            }),
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// A complete, ordered set of four corners. Not assumed to be a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    pub top_left: Point2,
    pub top_right: Point2,
    pub bottom_right: Point2,
    pub bottom_left: Point2,
}

impl Quad {
    pub fn centroid(&self) -> Point2 {
        Point2::new(
            (self.top_left.x + self.top_right.x + self.bottom_right.x + self.bottom_left.x) / 4.0,
            (self.top_left.y + self.top_right.y + self.bottom_right.y + self.bottom_left.y) / 4.0,
        )
    }

    /// Mean of the top and bottom edge lengths.
    pub fn mean_width(&self) -> f64 {
        (self.top_left.distance_to(&self.top_right)
            + self.bottom_left.distance_to(&self.bottom_right))
            / 2.0
    }

    /// Mean of the left and right edge lengths.
    pub fn mean_height(&self) -> f64 {
        (self.top_left.distance_to(&self.bottom_left)
            + self.top_right.distance_to(&self.bottom_right))
            / 2.0
    }

    pub fn top_edge(&self) -> f64 {
        self.top_left.distance_to(&self.top_right)
    }

    pub fn left_edge(&self) -> f64 {
        self.top_left.distance_to(&self.bottom_left)
    }
}
