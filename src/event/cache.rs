use axum::http::StatusCode;
use image::DynamicImage;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::atomic::{AtomicBool, Ordering},
};

pub static INSTANCE: Lazy<CacheManager> = Lazy::new(CacheManager::new);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("image error: {0}")]
    Image(image::ImageError),
    #[error("image too large: {0} bytes, max 10MB")]
    ImgTooLarge(usize),
    #[error("cache not found")]
    NotFound,
}

impl Error {
    pub fn to_status_code(&self) -> StatusCode {
        match self {
            Error::Image(_) => StatusCode::BAD_REQUEST,
            Error::ImgTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// An uploaded poster image pending to be referenced by an event.
#[derive(Serialize, Deserialize)]
pub struct PosterCache {
    pub hash: u64,
    pub uploader: u64,
    /// Indicates if this cache is blocked by an event.
    pub blocked: AtomicBool,

    /// The decoded image of this cache, only used for saving
    /// after pushing into a manager instance.
    #[serde(skip)]
    pub img: RwLock<Option<DynamicImage>>,
}

impl PosterCache {
    /// Create a new cache and its hash from image bytes.
    pub fn new(bytes: &[u8], uploader: u64) -> Result<Self, Error> {
        {
            let len = bytes.len();
            if len > 10_000_000 {
                return Err(Error::ImgTooLarge(len));
            }
        }

        let image = image::load_from_memory(bytes).map_err(Error::Image)?;

        let hash = {
            let mut hasher = DefaultHasher::new();
            bytes.hash(&mut hasher);
            hasher.finish()
        };

        Ok(Self {
            hash,
            uploader,
            blocked: AtomicBool::new(false),
            img: RwLock::new(Some(image)),
        })
    }

    fn save(&self) {
        #[cfg(not(test))]
        {
            let this = Self {
                hash: self.hash,
                uploader: self.uploader,
                blocked: AtomicBool::new(false),
                img: RwLock::new(self.img.write().take()),
            };

            tokio::spawn(async move {
                if let Some(img) = this.img.read().as_ref() {
                    img.save_with_format(
                        format!("./data/posters/{}.png", this.hash),
                        image::ImageFormat::Png,
                    )
                    .unwrap();
                }
                *this.img.write() = None;

                use tokio::io::AsyncWriteExt;

                if let Ok(mut file) =
                    tokio::fs::File::create(format!("./data/posters/{}.toml", this.hash)).await
                {
                    file.write_all(toml::to_string(&this).unwrap().as_bytes())
                        .await
                        .unwrap()
                }
            });
        }

        #[cfg(test)]
        {
            *self.img.write() = None;
        }
    }
}

pub struct CacheManager {
    pub caches: RwLock<Vec<PosterCache>>,
}

impl CacheManager {
    const MAX_UNBLOCKED_CACHE: usize = 64;

    pub fn new() -> Self {
        #[cfg(not(test))]
        {
            use std::fs::File;
            use std::io::Read;

            let mut vec = Vec::new();
            for dir in std::fs::read_dir("./data/posters").unwrap().flatten() {
                if let Ok(cache) = toml::from_str::<PosterCache>(&{
                    let mut string = String::new();
                    File::open(dir.path())
                        .unwrap()
                        .read_to_string(&mut string)
                        .unwrap();
                    string
                }) {
                    vec.push(cache)
                }
            }
            Self {
                caches: RwLock::new(vec),
            }
        }

        #[cfg(test)]
        Self {
            caches: RwLock::new(Vec::new()),
        }
    }

    /// Push and save a cache, evicting an unblocked one when full.
    pub fn push(&self, cache: PosterCache) {
        let cr = self.caches.read();

        if cr.iter().any(|e| e.hash == cache.hash) {
            return;
        }

        if Self::MAX_UNBLOCKED_CACHE
            <= cr
                .iter()
                .filter(|c| !c.blocked.load(Ordering::Acquire))
                .count()
        {
            let mut i = 0;
            for e in cr.iter().enumerate() {
                if !e.1.blocked.load(Ordering::Acquire) {
                    let _ = std::fs::remove_file(format!("./data/posters/{}.png", e.1.hash));
                    i = e.0;
                    break;
                }
            }
            drop(cr);
            self.caches.write().remove(i);
        } else {
            drop(cr)
        }

        cache.save();
        self.caches.write().push(cache);
    }

    #[cfg(test)]
    pub fn reset(&self) {
        *self.caches.write() = Vec::new();
    }
}
