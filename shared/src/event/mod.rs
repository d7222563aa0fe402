pub mod handle;

use serde::{Deserialize, Serialize};

/// Represents an event proposal submitted by a student.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Event {
    /// The only id of this event.
    pub id: u64,
    pub metadata: EventMetadata,
    /// Hash of the poster image in the cache, if any.
    pub poster: Option<u64>,
    /// The submitting student of this event in account id.
    pub publisher: u64,
    /// Department of the publisher, snapshotted at submission.
    pub department: String,
    pub status: ApprovalStatus,
    /// Reviewer remark of the latest approval or rejection.
    pub remark: Option<String>,
    /// The staff account that approved this event.
    pub approver: Option<u64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EventMetadata {
    pub title: String,
    pub category: Category,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub start_time: chrono::NaiveTime,
    pub end_time: chrono::NaiveTime,
    pub venue: String,
    pub description: String,
}

/// Describes the approval status of an event.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Approved,
    Pending,
    Rejected,
}

/// Represents categories an event belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Club Event")]
    ClubEvent,
    Cultural,
    Games,
    Other,
    Sports,
    Stall,
    Stayback,
    #[serde(rename = "Tech Talk")]
    TechTalk,
    Workshop,
}
