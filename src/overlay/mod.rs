//! Drawable primitives for the recommendation overlay.
//!
//! Projection is pure: the same recommendations always yield the same
//! primitives, in input order. Coordinates are desk-frame centimeters until
//! [`Overlay::to_image_space`] maps them onto the photo.

use serde::{Deserialize, Serialize};

use crate::calibration::{CalibrationError, CalibrationSession};
use crate::ergonomics::{Priority, Recommendation, ViolationKind};
use crate::models::Point2;

pub const WARNING_ZONE_RADIUS_CM: f64 = 30.0;
pub const WARNING_ZONE_ALPHA: f64 = 0.3;
pub const LABEL_BACKGROUND: &str = "rgba(0,0,0,0.7)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayColor {
    Green,
    Yellow,
    Red,
    White,
}

impl OverlayColor {
    fn for_priority(priority: Priority) -> Self {
        if priority <= Priority::Medium {
            OverlayColor::Green
        } else {
            OverlayColor::Yellow
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub from: Point2,
    pub to: Point2,
    pub color: OverlayColor,
    /// Display name of the item being moved.
    pub item: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub center: Point2,
    pub radius: f64,
    pub color: OverlayColor,
    pub alpha: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub position: Point2,
    pub text: String,
    pub color: OverlayColor,
    pub background: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub arrows: Vec<Arrow>,
    pub zones: Vec<Zone>,
    pub labels: Vec<Label>,
}

/// One arrow and one advice label per recommendation, plus a red warning
/// zone around items that sit too close.
pub fn project(recommendations: &[Recommendation]) -> Overlay {
    let mut overlay = Overlay::default();

    for recommendation in recommendations {
        let item = recommendation.category.display_name();

        overlay.arrows.push(Arrow {
            from: recommendation.current,
            to: recommendation.optimal,
            color: OverlayColor::for_priority(recommendation.priority),
            item: item.to_string(),
        });

        if recommendation.kind == ViolationKind::TooClose {
            overlay.zones.push(Zone {
                center: recommendation.current,
                radius: WARNING_ZONE_RADIUS_CM,
                color: OverlayColor::Red,
                alpha: WARNING_ZONE_ALPHA,
                label: format!("{item} too close"),
            });
        }

        overlay.labels.push(Label {
            position: recommendation.optimal,
            text: recommendation.advice.clone(),
            color: OverlayColor::White,
            background: LABEL_BACKGROUND.to_string(),
        });
    }

    overlay
}

impl Overlay {
    pub fn is_empty(&self) -> bool {
        self.arrows.is_empty() && self.zones.is_empty() && self.labels.is_empty()
    }

    /// Re-express every primitive in image pixels using the session's desk
    /// frame. Fails when the desk or scale is not set.
    pub fn to_image_space(&self, session: &CalibrationSession) -> Result<Overlay, CalibrationError> {
        let to_pixels = |point: Point2| session.desk_frame_to_pixels(point);
        let scale = session.scale().ok_or(CalibrationError::MissingScale)?;

        let arrows = self
            .arrows
            .iter()
            .map(|arrow| {
                Ok(Arrow {
                    from: to_pixels(arrow.from)?,
                    to: to_pixels(arrow.to)?,
                    ..arrow.clone()
                })
            })
            .collect::<Result<Vec<_>, CalibrationError>>()?;

        let zones = self
            .zones
            .iter()
            .map(|zone| {
                Ok(Zone {
                    center: to_pixels(zone.center)?,
                    radius: zone.radius * scale,
                    ..zone.clone()
                })
            })
            .collect::<Result<Vec<_>, CalibrationError>>()?;

        let labels = self
            .labels
            .iter()
            .map(|label| {
                Ok(Label {
                    position: to_pixels(label.position)?,
                    ..label.clone()
                })
            })
            .collect::<Result<Vec<_>, CalibrationError>>()?;

        Ok(Overlay {
            arrows,
            zones,
            labels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemCategory;

    fn make_recommendation(
        category: ItemCategory,
        priority: Priority,
        kind: ViolationKind,
    ) -> Recommendation {
        let current = Point2::new(5.0, 0.0);
        let optimal = Point2::new(20.0, 0.0);
        Recommendation {
            item_id: "item".to_string(),
            category,
            current,
            optimal,
            move_vector: optimal - current,
            priority,
            advice: "Move it".to_string(),
            kind,
        }
    }

    #[test]
    fn arrow_color_follows_priority() {
        let overlay = project(&[
            make_recommendation(ItemCategory::Keyboard, Priority::High, ViolationKind::TooFar),
            make_recommendation(ItemCategory::Laptop, Priority::Medium, ViolationKind::TooFar),
            make_recommendation(ItemCategory::Cup, Priority::Low, ViolationKind::TooFar),
        ]);
        let colors: Vec<OverlayColor> = overlay.arrows.iter().map(|arrow| arrow.color).collect();
        assert_eq!(
            colors,
            vec![OverlayColor::Green, OverlayColor::Green, OverlayColor::Yellow]
        );
        assert_eq!(overlay.arrows[2].item, "Coffee Mug");
        assert!(overlay.zones.is_empty());
        assert_eq!(overlay.labels.len(), 3);
    }

    #[test]
    fn too_close_adds_red_zone_at_current_position() {
        let overlay = project(&[make_recommendation(
            ItemCategory::Lamp,
            Priority::Medium,
            ViolationKind::TooClose,
        )]);
        assert_eq!(overlay.zones.len(), 1);
        let zone = &overlay.zones[0];
        assert_eq!(zone.center, Point2::new(5.0, 0.0));
        assert_eq!(zone.radius, 30.0);
        assert_eq!(zone.color, OverlayColor::Red);
        assert_eq!(zone.alpha, 0.3);
        assert_eq!(zone.label, "Desk Lamp too close");

        let label = &overlay.labels[0];
        assert_eq!(label.position, Point2::new(20.0, 0.0));
        assert_eq!(label.color, OverlayColor::White);
        assert_eq!(label.background, "rgba(0,0,0,0.7)");
    }

    #[test]
    fn no_recommendations_means_empty_overlay() {
        assert!(project(&[]).is_empty());
    }

    #[test]
    fn image_space_uses_desk_frame_inverse() {
        let mut session = CalibrationSession::default();
        for (x, y) in [(0.0, 0.0), (85.0, 0.0), (85.0, 54.0), (0.0, 54.0)] {
            session.add_calibration_point(x, y).unwrap();
        }
        session.compute_scale().unwrap();
        for (x, y) in [(100.0, 100.0), (900.0, 100.0), (900.0, 500.0), (100.0, 500.0)] {
            session.add_desk_corner(x, y).unwrap();
        }

        let overlay = project(&[make_recommendation(
            ItemCategory::Keyboard,
            Priority::High,
            ViolationKind::TooClose,
        )]);
        let pixels = overlay.to_image_space(&session).unwrap();

        assert!((pixels.arrows[0].from.x - 550.0).abs() < 1e-9);
        assert!((pixels.arrows[0].from.y - 300.0).abs() < 1e-9);
        assert!((pixels.arrows[0].to.x - 700.0).abs() < 1e-9);
        assert!((pixels.zones[0].radius - 300.0).abs() < 1e-9);
        assert!((pixels.labels[0].position.x - 700.0).abs() < 1e-9);
    }

    #[test]
    fn image_space_requires_calibration() {
        let overlay = project(&[make_recommendation(
            ItemCategory::Keyboard,
            Priority::High,
            ViolationKind::TooFar,
        )]);
        assert!(overlay.to_image_space(&CalibrationSession::default()).is_err());
    }
}
