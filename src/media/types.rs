//! Image cache types and error definitions.

use std::path::PathBuf;

use thiserror::Error;

use crate::upstream::BodyError;

/// Route prefix under which cached images are served.
pub const CACHED_IMAGE_ROUTE: &str = "/cached_image";

/// File extension of every cache entry.
pub const CACHED_IMAGE_EXTENSION: &str = "gif";

/// Content type of every cache entry.
pub const CACHED_IMAGE_CONTENT_TYPE: &str = "image/gif";

/// A transformed image stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedImage {
    /// Content-addressed file name, e.g. `3f2a…9c.gif`.
    pub file_name: String,
    /// Location inside the cache directory.
    pub path: PathBuf,
}

impl CachedImage {
    /// URL the client uses to fetch this entry back through the proxy.
    pub fn served_url(&self) -> String {
        format!("{}/{}", CACHED_IMAGE_ROUTE, self.file_name)
    }
}

/// Failure while producing a single cached image.
///
/// Always local to one `<img>` reference; never fails a page.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Network-level failure reaching the image origin.
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Source image is larger than `images.max_source_bytes`.
    #[error("source image exceeds {0} bytes")]
    TooLarge(usize),

    /// Origin answered with a non-success status.
    #[error("origin returned status {0}")]
    Status(u16),

    /// Bytes were not a decodable image.
    #[error("decode failed: {0}")]
    Decode(#[from] image::ImageError),

    /// Output exceeded what the encoder accepts or encoding failed.
    #[error("encode failed: {0}")]
    Encode(String),

    /// Writing the cache entry failed.
    #[error("cache write failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BodyError> for ImageError {
    fn from(err: BodyError) -> Self {
        match err {
            BodyError::TooLarge { limit } => ImageError::TooLarge(limit),
            BodyError::Read(e) => ImageError::Fetch(e),
        }
    }
}

impl From<gif::EncodingError> for ImageError {
    fn from(err: gif::EncodingError) -> Self {
        ImageError::Encode(err.to_string())
    }
}
