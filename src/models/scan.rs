use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One analyzed photo. `desk_bounds` is stored verbatim as produced by
/// `CalibrationSession::desk_bounds_json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scan {
    pub id: i64,
    pub profile_id: Option<i64>,
    pub image_path: String,
    pub scale: Option<f64>,
    pub desk_bounds: Option<String>,
    pub scanned_at: DateTime<Utc>,
}
