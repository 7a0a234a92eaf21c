use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a capture session's progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Whether the session is currently listening (or winding down)
    pub is_listening: bool,

    /// When the current capture started
    pub started_at: DateTime<Utc>,

    /// Seconds since the capture started
    pub duration_secs: f64,

    /// Engine-forced ends absorbed by transparent restarts so far
    pub restarts: usize,

    /// Finalized transcript segments accumulated so far
    pub finalized_segments: usize,
}
