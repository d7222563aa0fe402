pub mod handle;

use axum::http::StatusCode;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

pub use campus_events_shared::feedback::*;

pub static INSTANCE: Lazy<FeedbackManager> = Lazy::new(FeedbackManager::new);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("rating {0} out of range, expected 1 to 5")]
    RatingOutOfRange(u8),
    #[error("permission denied")]
    PermissionDenied,
}

impl Error {
    pub fn to_status_code(&self) -> StatusCode {
        match self {
            Error::RatingOutOfRange(_) => StatusCode::BAD_REQUEST,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
        }
    }
}

pub fn save_entry(_entry: &FeedbackEntry) {
    #[cfg(not(test))]
    {
        let this = _entry.clone();

        tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;

            if let Ok(mut file) =
                tokio::fs::File::create(format!("./data/feedback/{}.toml", this.id)).await
            {
                file.write_all(toml::to_string(&this).unwrap().as_bytes())
                    .await
                    .unwrap()
            }
        });
    }
}

/// An append-only log of feedback entries.
pub struct FeedbackManager {
    pub entries: RwLock<Vec<FeedbackEntry>>,
}

impl FeedbackManager {
    fn new() -> Self {
        #[cfg(not(test))]
        {
            use std::fs::{self, File};
            use std::io::Read;

            let mut vec = Vec::new();

            for dir in fs::read_dir("./data/feedback").unwrap().flatten() {
                if let Ok(entry) = toml::from_str::<FeedbackEntry>(&{
                    let mut string = String::new();
                    File::open(dir.path())
                        .unwrap()
                        .read_to_string(&mut string)
                        .unwrap();
                    string
                }) {
                    vec.push(entry)
                }
            }

            Self {
                entries: RwLock::new(vec),
            }
        }

        #[cfg(test)]
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn push(&self, entry: FeedbackEntry) {
        self.entries.write().push(entry)
    }

    #[cfg(test)]
    pub fn reset(&self) {
        *self.entries.write() = Vec::new();
    }
}
