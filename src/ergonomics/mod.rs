//! Ergonomic rule engine: evaluates desk-frame positions against the rules
//! for a role and scores the layout.

pub mod engine;
pub mod rules;
pub mod scoring;

pub use engine::{analyze, evaluate, AnalysisResult, Evaluation, Recommendation, Violation, ViolationKind};
pub use rules::{built_in_rules, ErgonomicRule, Priority};
pub use scoring::{score, severity_multiplier, ScoreRating};
