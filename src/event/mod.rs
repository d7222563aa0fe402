pub(crate) mod cache;
pub mod handle;

use axum::http::StatusCode;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

pub use campus_events_shared::event::*;

pub static INSTANCE: Lazy<EventManager> = Lazy::new(EventManager::new);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("cache error: {0}")]
    Cache(cache::Error),
    #[error("event id conflicted")]
    Conflict,
    #[error("event not found")]
    NotFound,
    #[error("event already in status: {0:?}")]
    Already(ApprovalStatus),
    #[error("cannot operate events submitted to another department")]
    DepartmentMismatch,
    #[error("only pending events can be withdrawn by their publisher")]
    NotPending,
    #[error("permission denied")]
    PermissionDenied,
}

impl Error {
    pub fn to_status_code(&self) -> StatusCode {
        match self {
            Error::Cache(err) => err.to_status_code(),
            Error::Conflict => StatusCode::CONFLICT,
            Error::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::FORBIDDEN,
        }
    }
}

pub fn save_event(_event: &Event) {
    #[cfg(not(test))]
    {
        let this = _event.clone();

        tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;

            if let Ok(mut file) =
                tokio::fs::File::create(format!("./data/events/{}.toml", this.id)).await
            {
                file.write_all(toml::to_string(&this).unwrap().as_bytes())
                    .await
                    .unwrap()
            }
        });
    }
}

pub fn remove_event(_event: &Event) {
    #[cfg(not(test))]
    {
        let id = _event.id;

        tokio::spawn(async move {
            tokio::fs::remove_file(format!("./data/events/{}.toml", id))
                .await
                .unwrap()
        });
    }
}

pub struct EventManager {
    pub events: RwLock<Vec<RwLock<Event>>>,
}

impl EventManager {
    fn new() -> Self {
        #[cfg(not(test))]
        {
            use std::fs::{self, File};
            use std::io::Read;

            let mut vec = Vec::new();

            for dir in fs::read_dir("./data/events").unwrap().flatten() {
                if let Ok(event) = toml::from_str::<Event>(&{
                    let mut string = String::new();
                    File::open(dir.path())
                        .unwrap()
                        .read_to_string(&mut string)
                        .unwrap();
                    string
                }) {
                    vec.push(RwLock::new(event))
                }
            }

            Self {
                events: RwLock::new(vec),
            }
        }

        #[cfg(test)]
        Self {
            events: RwLock::new(Vec::new()),
        }
    }

    pub fn push(&self, event: Event) {
        self.events.write().push(RwLock::new(event))
    }

    /// Indicates if the target id is already contained in this instance.
    pub fn contains_id(&self, id: u64) -> bool {
        self.events.read().iter().any(|e| e.read().id == id)
    }

    #[cfg(test)]
    pub fn reset(&self) {
        *self.events.write() = Vec::new();
    }
}
