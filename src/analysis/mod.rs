//! Background analysis runs and post-run review.

pub mod controller;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod review;

pub use controller::{AnalysisController, AnalysisRequest};
pub use error::{PipelineError, Stage, StageFailure};
pub use events::{AnalysisEvent, AnalysisReport, ProgressUpdate};
pub use pipeline::{run_analysis, AnalysisJob, RunOutcome};
pub use review::ReviewSession;
