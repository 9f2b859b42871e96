//! Desk item data model.
//!
//! A `DetectedItem` starts life in pixel coordinates (as reported by a
//! detector or entered by hand) and is re-created in desk-frame centimeters
//! once the calibration transform has been applied.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geometry::{Point2, Size2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Keyboard,
    Mouse,
    Monitor,
    Laptop,
    Phone,
    Tablet,
    Cup,
    Notebook,
    Pen,
    Lamp,
    Speaker,
    Headphones,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 12] = [
        ItemCategory::Keyboard,
        ItemCategory::Mouse,
        ItemCategory::Monitor,
        ItemCategory::Laptop,
        ItemCategory::Phone,
        ItemCategory::Tablet,
        ItemCategory::Cup,
        ItemCategory::Notebook,
        ItemCategory::Pen,
        ItemCategory::Lamp,
        ItemCategory::Speaker,
        ItemCategory::Headphones,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Keyboard => "keyboard",
            ItemCategory::Mouse => "mouse",
            ItemCategory::Monitor => "monitor",
            ItemCategory::Laptop => "laptop",
            ItemCategory::Phone => "phone",
            ItemCategory::Tablet => "tablet",
            ItemCategory::Cup => "cup",
            ItemCategory::Notebook => "notebook",
            ItemCategory::Pen => "pen",
            ItemCategory::Lamp => "lamp",
            ItemCategory::Speaker => "speaker",
            ItemCategory::Headphones => "headphones",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ItemCategory::Keyboard => "Keyboard",
            ItemCategory::Mouse => "Mouse",
            ItemCategory::Monitor => "Monitor",
            ItemCategory::Laptop => "Laptop",
            ItemCategory::Phone => "Phone",
            ItemCategory::Tablet => "Tablet",
            ItemCategory::Cup => "Coffee Mug",
            ItemCategory::Notebook => "Notebook",
            ItemCategory::Pen => "Pen",
            ItemCategory::Lamp => "Desk Lamp",
            ItemCategory::Speaker => "Speaker",
            ItemCategory::Headphones => "Headphones",
        }
    }

    /// Map a raw object-detector class label onto a desk category.
    /// Labels with no desk counterpart return `None`.
    pub fn from_detector_class(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "laptop" => Some(ItemCategory::Laptop),
            "cell phone" => Some(ItemCategory::Phone),
            "book" => Some(ItemCategory::Notebook),
            "cup" => Some(ItemCategory::Cup),
            "mouse" => Some(ItemCategory::Mouse),
            "keyboard" => Some(ItemCategory::Keyboard),
            // Detectors trained on household scenes report monitors as TVs
            // and mice as remotes.
            "tv" => Some(ItemCategory::Monitor),
            "remote" => Some(ItemCategory::Mouse),
            _ => None,
        }
    }

    /// Categories whose recommended angle mirrors for left-handed users.
    pub fn is_handed(&self) -> bool {
        matches!(self, ItemCategory::Mouse | ItemCategory::Keyboard)
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemCategory {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        ItemCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| anyhow!("unknown item category '{value}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Automatic,
    Manual,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Automatic => "automatic",
            Provenance::Manual => "manual",
        }
    }
}

impl FromStr for Provenance {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "automatic" => Ok(Provenance::Automatic),
            "manual" => Ok(Provenance::Manual),
            other => Err(anyhow!("unknown item provenance '{other}'")),
        }
    }
}

/// One candidate as reported by a detector, in image pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub category: ItemCategory,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: f64,
    #[serde(default)]
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedItem {
    pub id: String,
    pub category: ItemCategory,
    pub center: Point2,
    pub size: Size2,
    pub confidence: f64,
    pub rotation: f64,
    pub provenance: Provenance,
}

impl DetectedItem {
    pub fn from_detection(detection: &RawDetection) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            category: detection.category,
            center: Point2::new(detection.x, detection.y),
            size: Size2::new(detection.width, detection.height),
            confidence: detection.confidence,
            rotation: detection.rotation,
            provenance: Provenance::Automatic,
        }
    }

    /// A user-placed item. Manual entries are trusted fully.
    pub fn manual(category: ItemCategory, center: Point2, size: Size2) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            category,
            center,
            size,
            confidence: 1.0,
            rotation: 0.0,
            provenance: Provenance::Manual,
        }
    }

    /// Distance from the desk-frame origin. Only meaningful after transform.
    pub fn distance_from_origin(&self) -> f64 {
        self.center.norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detector_labels_map_onto_desk_categories() {
        assert_eq!(
            ItemCategory::from_detector_class("cell phone"),
            Some(ItemCategory::Phone)
        );
        assert_eq!(
            ItemCategory::from_detector_class("TV"),
            Some(ItemCategory::Monitor)
        );
        assert_eq!(
            ItemCategory::from_detector_class("remote"),
            Some(ItemCategory::Mouse)
        );
        assert_eq!(ItemCategory::from_detector_class("potted plant"), None);
    }

    #[test]
    fn category_parsing_is_case_insensitive() {
        assert_eq!(
            " Headphones ".parse::<ItemCategory>().unwrap(),
            ItemCategory::Headphones
        );
        assert!("stapler".parse::<ItemCategory>().is_err());
    }

    #[test]
    fn manual_items_have_full_confidence() {
        let item = DetectedItem::manual(
            ItemCategory::Cup,
            Point2::new(10.0, 5.0),
            Size2::new(8.0, 8.0),
        );
        assert_eq!(item.confidence, 1.0);
        assert_eq!(item.provenance, Provenance::Manual);
        assert_eq!(item.rotation, 0.0);
    }
}
