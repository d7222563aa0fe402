pub mod handle;

use serde::{Deserialize, Serialize};

/// An immutable feedback entry submitted by a student.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FeedbackEntry {
    /// The only id of this entry.
    pub id: u64,
    /// Username of the submitting student.
    pub username: String,
    /// Star rating from 1 to 5.
    pub rating: u8,
    pub message: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
