use serde::Serialize;
use serde_json::Value;

use crate::timeline::CreationTimeline;

/// One row of the suspicious handle table. `count` is the number of posts
/// by `screen_name` across the whole input, not the number of rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuspiciousHandleEntry {
    pub screen_name: String,
    pub date: Option<Value>,
    pub description: Option<Value>,
    pub geolocation: Option<Value>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandleCount {
    pub screen_name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HandleStats {
    pub total_posts: usize,
    pub suspicious_occurrences: usize,
    pub distinct_handles: usize,
    pub duplicate_rows_removed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandleReport {
    pub entries: Vec<SuspiciousHandleEntry>,
    /// Per-handle totals, highest first, ties in first-seen order.
    pub handle_counts: Vec<HandleCount>,
    pub stats: HandleStats,
}

/// Everything computed for one input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub report: HandleReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<CreationTimeline>,
}
