use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point or vector in either pixel space or desk-frame centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ORIGIN: Point2 = Point2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Polar construction: `radius` along `angle_rad` measured from +x.
    pub fn from_polar(radius: f64, angle_rad: f64) -> Self {
        Self {
            x: radius * angle_rad.cos(),
            y: radius * angle_rad.sin(),
        }
    }

    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance_to(&self, other: &Point2) -> f64 {
        (*self - *other).norm()
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    pub fn to_pair(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl Add for Point2 {
    type Output = Point2;

    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;

    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size2 {
    pub width: f64,
    pub height: f64,
}

impl Size2 {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}
