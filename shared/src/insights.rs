use serde::{Deserialize, Serialize};

/// Aggregated counters for a staff dashboard, scoped to
/// the requesting staff member's department.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct InsightsResult {
    /// Distinct student accounts of the department.
    pub total_students: u64,
    /// All event requests submitted to the department.
    pub total_requests: u64,
    pub approved: u64,
    pub rejected: u64,
    pub pending: u64,
}
