use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct GetPosterDescriptor {
    pub hash: u64,
}

#[derive(Serialize, Deserialize)]
pub struct EventDescriptor {
    pub title: String,
    pub category: super::Category,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub start_time: chrono::NaiveTime,
    pub end_time: chrono::NaiveTime,
    pub venue: String,
    pub description: String,
    /// Hash of an uploaded poster cache.
    pub poster: Option<u64>,
}

#[derive(Serialize, Deserialize)]
pub struct GetEventsDescriptor {
    pub filters: Vec<GetEventsFilter>,
}

#[derive(Serialize, Deserialize, Clone)]
pub enum GetEventsFilter {
    /// Events submitted to the target department.
    Department(String),
    /// Events which their title or description contains target keywords.
    Keyword(String),
    /// Events submitted by the target account.
    Publisher(u64),
    /// Events that match the target approval status.
    Status(super::ApprovalStatus),
}

#[derive(Serialize, Deserialize)]
pub struct ReviewEventDescriptor {
    pub event: u64,
    pub variant: ReviewEventVariant,
}

#[derive(Serialize, Deserialize, Clone)]
pub enum ReviewEventVariant {
    Approve(
        /// Optional remark to the publisher.
        Option<String>,
    ),
    Reject(
        /// Optional remark to the publisher.
        Option<String>,
    ),
    /// Put the event back to pending and clear its approver.
    Reset,
}

#[derive(Serialize, Deserialize)]
pub struct DeleteEventDescriptor {
    pub event: u64,
}
