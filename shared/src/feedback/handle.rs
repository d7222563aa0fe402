use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct FeedbackDescriptor {
    /// Star rating from 1 to 5.
    pub rating: u8,
    /// May be empty.
    pub message: String,
}
