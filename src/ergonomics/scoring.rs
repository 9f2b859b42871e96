use serde::{Deserialize, Serialize};

use crate::settings::ScoringSettings;

use super::engine::{Violation, ViolationKind};

pub const PERFECT_SCORE: f64 = 100.0;
const MAX_SEVERITY: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreRating {
    Excellent,
    Good,
    Poor,
}

impl ScoreRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreRating::Excellent => "excellent",
            ScoreRating::Good => "good",
            ScoreRating::Poor => "poor",
        }
    }
}

/// How far past its bound an item sits, as a penalty weight in `[1, 2]`.
///
/// The deviation is relative to the bound itself.
pub fn severity_multiplier(violation: &Violation) -> f64 {
    let bound = violation.bound_cm;
    let distance = violation.measured_distance_cm;
    let deviation = match violation.kind {
        ViolationKind::TooClose => (bound - distance) / bound,
        ViolationKind::TooFar => (distance - bound) / bound,
    };

    if deviation < 0.1 {
        1.0
    } else if deviation < 0.3 {
        1.0 + (deviation - 0.1) * 2.5
    } else if deviation < 0.5 {
        1.5 + (deviation - 0.3) * 2.5
    } else {
        MAX_SEVERITY
    }
}

/// Composite placement score in `[0, 100]`, rounded to one decimal with
/// exact halves going to the even digit.
///
/// Penalties are normalised against the worst case for the same set of
/// violations, so the score depends on the priority mix and not only on
/// the total penalty.
pub fn score(violations: &[Violation], settings: &ScoringSettings) -> f64 {
    if violations.is_empty() {
        return PERFECT_SCORE;
    }

    let (total, max) = violations.iter().fold((0.0, 0.0), |(total, max), violation| {
        let base = settings.penalty_for(violation.rule.priority);
        (
            total + base * severity_multiplier(violation),
            max + base * MAX_SEVERITY,
        )
    });

    let raw = (PERFECT_SCORE - total / max * PERFECT_SCORE).max(0.0);
    (raw * 10.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ergonomics::rules::built_in_rules;
    use crate::models::Role;

    fn make_violation(kind: ViolationKind, distance: f64, bound: f64, rule_index: usize) -> Violation {
        let rule = built_in_rules(Role::Coder).remove(rule_index);
        Violation {
            item_id: "item".to_string(),
            category: rule.category,
            rule,
            kind,
            measured_distance_cm: distance,
            bound_cm: bound,
        }
    }

    #[test]
    fn no_violations_is_perfect() {
        assert_eq!(score(&[], &ScoringSettings::default()), 100.0);
    }

    #[test]
    fn severity_bands() {
        let close = |d| severity_multiplier(&make_violation(ViolationKind::TooClose, d, 10.0, 0));
        assert_eq!(close(9.5), 1.0);
        assert!((close(8.0) - 1.25).abs() < 1e-9);
        assert!((close(6.0) - 1.75).abs() < 1e-9);
        assert_eq!(close(5.0), 2.0);
        assert_eq!(close(0.0), 2.0);

        let far = severity_multiplier(&make_violation(ViolationKind::TooFar, 36.0, 30.0, 0));
        assert!((far - 1.25).abs() < 1e-9);
    }

    #[test]
    fn single_high_priority_at_max_severity_scores_zero() {
        let violation = make_violation(ViolationKind::TooClose, 5.0, 10.0, 0);
        assert_eq!(score(&[violation], &ScoringSettings::default()), 0.0);
    }

    #[test]
    fn mild_violation_scores_fifty() {
        let violation = make_violation(ViolationKind::TooClose, 9.5, 10.0, 0);
        assert_eq!(score(&[violation], &ScoringSettings::default()), 50.0);
    }

    #[test]
    fn score_does_not_increase_with_severity() {
        let settings = ScoringSettings::default();
        let mut previous = PERFECT_SCORE;
        for distance in [9.9, 9.0, 8.0, 7.0, 6.0, 5.0, 2.0] {
            let current = score(&[make_violation(ViolationKind::TooClose, distance, 10.0, 0)], &settings);
            assert!(current <= previous, "{current} > {previous} at {distance}");
            previous = current;
        }
    }

    #[test]
    fn adding_a_minor_violation_can_raise_the_score() {
        let settings = ScoringSettings::default();
        let severe = make_violation(ViolationKind::TooClose, 5.0, 10.0, 0);
        // Last coder rule is a priority 3 rule.
        let minor = make_violation(ViolationKind::TooFar, 51.0, 50.0, 5);
        assert_eq!(score(&[severe.clone()], &settings), 0.0);
        assert_eq!(score(&[severe, minor], &settings), 12.5);
    }

    #[test]
    fn exact_half_rounds_to_even_digit() {
        let settings = ScoringSettings::default();
        // severity 1.5 + (25.25 / 75 - 0.3) * 2.5, weighted 60
        let severe = make_violation(ViolationKind::TooClose, 49.75, 75.0, 0);
        // priority 2 rule, mild overshoot
        let mild = make_violation(ViolationKind::TooFar, 31.0, 30.0, 3);
        // raw = 100 - 135.5 / 200 * 100 = 32.25
        assert_eq!(score(&[severe, mild], &settings), 32.2);
    }

    #[test]
    fn custom_penalties_change_the_weighting() {
        let settings = ScoringSettings {
            priority_1_penalty: 10.0,
            ..ScoringSettings::default()
        };
        let severe = make_violation(ViolationKind::TooClose, 5.0, 10.0, 0);
        let minor = make_violation(ViolationKind::TooFar, 51.0, 50.0, 5);
        // total = 10*2 + 20*1 = 40, max = 20 + 40 = 60
        assert_eq!(score(&[severe, minor], &settings), 33.3);
    }
}
