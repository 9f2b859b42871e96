//! Role-specific placement rules and the built-in rule table.

use std::fmt;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::models::{ItemCategory, Role};

/// Rule importance. `High` rules are reported first and weigh the most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Priority {
    pub fn from_level(level: i64) -> Result<Self> {
        match level {
            1 => Ok(Priority::High),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::Low),
            other => Err(anyhow!("priority level must be 1, 2 or 3 (got {other})")),
        }
    }

    pub fn level(&self) -> u8 {
        *self as u8
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.level()
    }
}

impl TryFrom<u8> for Priority {
    type Error = anyhow::Error;

    fn try_from(level: u8) -> Result<Self> {
        Priority::from_level(i64::from(level))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErgonomicRule {
    pub role: Role,
    pub category: ItemCategory,
    pub min_distance_cm: Option<f64>,
    pub max_distance_cm: Option<f64>,
    /// Recommended bearing from the desk center, degrees from +x.
    pub ideal_angle_degrees: f64,
    pub priority: Priority,
    pub advice_text: String,
}

impl ErgonomicRule {
    /// Lower bound in effect. A stored 0 cm means no bound.
    pub fn min_bound(&self) -> Option<f64> {
        self.min_distance_cm.filter(|min| *min != 0.0)
    }

    /// Upper bound in effect. A stored 0 cm means no bound.
    pub fn max_bound(&self) -> Option<f64> {
        self.max_distance_cm.filter(|max| *max != 0.0)
    }

    /// A rule with neither bound can never be violated.
    pub fn is_actionable(&self) -> bool {
        self.min_bound().is_some() || self.max_bound().is_some()
    }

    /// Midpoint of the allowed band, or the single bound when only one is set.
    pub fn optimal_distance(&self) -> Option<f64> {
        match (self.min_bound(), self.max_bound()) {
            (Some(min), Some(max)) => Some((min + max) / 2.0),
            (Some(min), None) => Some(min),
            (None, Some(max)) => Some(max),
            (None, None) => None,
        }
    }
}

type SeedRow = (ItemCategory, f64, f64, f64, Priority, &'static str);

const CODER_RULES: &[SeedRow] = &[
    (ItemCategory::Keyboard, 10.0, 30.0, 0.0, Priority::High, "Keep keyboard centered and close to avoid shoulder strain"),
    (ItemCategory::Mouse, 15.0, 35.0, 15.0, Priority::High, "Mouse should be within easy reach, slightly to the side of your dominant hand"),
    (ItemCategory::Monitor, 40.0, 70.0, 0.0, Priority::High, "Monitor at arm's length, centered with keyboard"),
    (ItemCategory::Laptop, 35.0, 60.0, 0.0, Priority::Medium, "Laptop should be centered, consider an external monitor"),
    (ItemCategory::Phone, 20.0, 40.0, 45.0, Priority::Low, "Keep phone within reach but out of the primary workspace"),
    (ItemCategory::Cup, 25.0, 50.0, -30.0, Priority::Low, "Place drinks to the side to avoid spills"),
];

const ARTIST_RULES: &[SeedRow] = &[
    (ItemCategory::Keyboard, 40.0, 60.0, -45.0, Priority::Medium, "Move keyboard aside to clear space for the drawing tablet"),
    (ItemCategory::Tablet, 15.0, 35.0, 0.0, Priority::High, "Drawing tablet should be centered and close"),
    (ItemCategory::Pen, 10.0, 25.0, 0.0, Priority::High, "Keep pens within easy reach of the tablet"),
    (ItemCategory::Monitor, 40.0, 70.0, 0.0, Priority::High, "Monitor at arm's length, slightly above the tablet"),
    (ItemCategory::Lamp, 30.0, 50.0, 45.0, Priority::Medium, "Good lighting is essential for detailed work"),
];

const GAMER_RULES: &[SeedRow] = &[
    (ItemCategory::Keyboard, 10.0, 25.0, 0.0, Priority::High, "Keyboard should be close for quick access"),
    (ItemCategory::Mouse, 10.0, 30.0, 20.0, Priority::High, "Mouse needs room for wide movements on the dominant-hand side"),
    (ItemCategory::Monitor, 35.0, 60.0, 0.0, Priority::High, "Monitor closer than a typical work setup for better focus"),
    (ItemCategory::Headphones, 15.0, 35.0, -45.0, Priority::Medium, "Headphones within easy reach for voice chat"),
    (ItemCategory::Speaker, 40.0, 70.0, 30.0, Priority::Low, "Speakers positioned for good audio without cluttering the workspace"),
];

const ADMIN_RULES: &[SeedRow] = &[
    (ItemCategory::Keyboard, 15.0, 35.0, 0.0, Priority::High, "Keyboard centered at a comfortable typing distance"),
    (ItemCategory::Mouse, 15.0, 35.0, 15.0, Priority::High, "Mouse positioned for easy access without overreaching"),
    (ItemCategory::Monitor, 45.0, 75.0, 0.0, Priority::High, "Monitor at a proper distance to reduce eye strain"),
    (ItemCategory::Phone, 10.0, 30.0, -30.0, Priority::Medium, "Phone within easy reach for frequent calls"),
    (ItemCategory::Notebook, 20.0, 40.0, -45.0, Priority::Low, "Notebook nearby for taking notes during calls"),
    (ItemCategory::Lamp, 30.0, 50.0, 45.0, Priority::Medium, "Good lighting to reduce eye strain"),
];

/// The rule table shipped with the application, ordered by ascending
/// priority. The database seeds itself from this table.
pub fn built_in_rules(role: Role) -> Vec<ErgonomicRule> {
    let rows = match role {
        Role::Coder => CODER_RULES,
        Role::Artist => ARTIST_RULES,
        Role::Gamer => GAMER_RULES,
        Role::Admin => ADMIN_RULES,
    };

    let mut rules: Vec<ErgonomicRule> = rows
        .iter()
        .map(|(category, min, max, angle, priority, advice)| ErgonomicRule {
            role,
            category: *category,
            min_distance_cm: Some(*min),
            max_distance_cm: Some(*max),
            ideal_angle_degrees: *angle,
            priority: *priority,
            advice_text: (*advice).to_string(),
        })
        .collect();
    rules.sort_by_key(|rule| rule.priority);
    rules
}
