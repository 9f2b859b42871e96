//! Rule evaluation: desk-frame item positions in, violations and move
//! recommendations out.

use serde::{Deserialize, Serialize};

use crate::models::{DetectedItem, Handedness, ItemCategory, Point2};
use crate::settings::ScoringSettings;

use super::rules::{ErgonomicRule, Priority};
use super::scoring::{score, ScoreRating};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    TooClose,
    TooFar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub item_id: String,
    pub category: ItemCategory,
    pub rule: ErgonomicRule,
    pub kind: ViolationKind,
    pub measured_distance_cm: f64,
    /// The bound that was crossed.
    pub bound_cm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub item_id: String,
    pub category: ItemCategory,
    pub current: Point2,
    pub optimal: Point2,
    pub move_vector: Point2,
    pub priority: Priority,
    pub advice: String,
    pub kind: ViolationKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub violations: Vec<Violation>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub violations: Vec<Violation>,
    pub recommendations: Vec<Recommendation>,
    pub score: f64,
    pub rating: ScoreRating,
}

/// Check every item against every rule for its category.
///
/// Distance is measured from the desk-frame origin. Only the recommended
/// bearing depends on handedness: mouse and keyboard angles are mirrored
/// for left-handed users. Output is stably sorted by ascending priority.
pub fn evaluate(
    items: &[DetectedItem],
    rules: &[ErgonomicRule],
    handedness: Handedness,
) -> Evaluation {
    let mut evaluation = Evaluation::default();

    for item in items {
        let distance = item.distance_from_origin();

        for rule in rules.iter().filter(|rule| rule.category == item.category) {
            let Some((kind, bound)) = classify(distance, rule) else {
                continue;
            };
            let Some(optimal_distance) = rule.optimal_distance() else {
                continue;
            };

            let mut angle = rule.ideal_angle_degrees.to_radians();
            if handedness == Handedness::Left && item.category.is_handed() {
                angle = -angle;
            }
            let optimal = Point2::from_polar(optimal_distance, angle);

            evaluation.violations.push(Violation {
                item_id: item.id.clone(),
                category: item.category,
                rule: rule.clone(),
                kind,
                measured_distance_cm: distance,
                bound_cm: bound,
            });
            evaluation.recommendations.push(Recommendation {
                item_id: item.id.clone(),
                category: item.category,
                current: item.center,
                optimal,
                move_vector: optimal - item.center,
                priority: rule.priority,
                advice: rule.advice_text.clone(),
                kind,
            });
        }
    }

    evaluation.violations.sort_by_key(|violation| violation.rule.priority);
    evaluation
        .recommendations
        .sort_by_key(|recommendation| recommendation.priority);
    evaluation
}

/// The lower bound wins when an item somehow violates both.
fn classify(distance: f64, rule: &ErgonomicRule) -> Option<(ViolationKind, f64)> {
    if let Some(min) = rule.min_bound() {
        if distance < min {
            return Some((ViolationKind::TooClose, min));
        }
    }
    if let Some(max) = rule.max_bound() {
        if distance > max {
            return Some((ViolationKind::TooFar, max));
        }
    }
    None
}

/// Evaluate and score in one step.
pub fn analyze(
    items: &[DetectedItem],
    rules: &[ErgonomicRule],
    handedness: Handedness,
    scoring: &ScoringSettings,
) -> AnalysisResult {
    let Evaluation {
        violations,
        recommendations,
    } = evaluate(items, rules, handedness);
    let score = score(&violations, scoring);

    AnalysisResult {
        rating: scoring.rating(score),
        violations,
        recommendations,
        score,
    }
}
