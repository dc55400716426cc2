//! Content-addressed cache of transformed images.
//!
//! # Responsibilities
//! - Map a source URL to a deterministic file name (SHA-256 of the URL)
//! - Return existing entries without touching the network
//! - Fetch, transform and persist missing entries
//!
//! # Design Decisions
//! - Failed fetches create no entry, so a later reference retries
//! - Source bodies are capped before decoding
//! - Entries are written to a temporary name and renamed into place
//! - Two concurrent misses for one URL may both transform; the results are
//!   identical so the last rename wins harmlessly

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::config::ImageConfig;
use crate::media::transform::to_bilevel_gif;
use crate::media::types::{CachedImage, ImageError, CACHED_IMAGE_EXTENSION};
use crate::observability::metrics;
use crate::upstream::read_limited;

/// Content-addressed file name for `url`.
pub fn cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}.{}", hasher.finalize(), CACHED_IMAGE_EXTENSION)
}

/// Fetch-or-create store of 1-bit images.
pub struct ImageCache {
    dir: PathBuf,
    client: reqwest::Client,
    max_width: u32,
    max_height: u32,
    max_source_bytes: usize,
}

impl ImageCache {
    /// Create a cache rooted at `config.cache_dir`, fetching with `client`.
    ///
    /// The client carries the configured User-Agent and timeouts.
    pub fn new(config: &ImageConfig, client: reqwest::Client) -> Self {
        Self {
            dir: PathBuf::from(&config.cache_dir),
            client,
            max_width: config.max_width,
            max_height: config.max_height,
            max_source_bytes: config.max_source_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Return the cached entry for `url`, creating it on first reference.
    pub async fn resolve(&self, url: &str) -> Result<CachedImage, ImageError> {
        let file_name = cache_key(url);
        let path = self.dir.join(&file_name);
        let entry = CachedImage { file_name, path };

        if tokio::fs::try_exists(&entry.path).await.unwrap_or(false) {
            tracing::debug!(url = %url, file = %entry.file_name, "Image already cached");
            metrics::record_image("hit");
            return Ok(entry);
        }

        match self.fetch_and_store(url, &entry).await {
            Ok(()) => {
                tracing::info!(url = %url, file = %entry.file_name, "Image cached");
                metrics::record_image("stored");
                Ok(entry)
            }
            Err(e) => {
                metrics::record_image("failed");
                Err(e)
            }
        }
    }

    async fn fetch_and_store(&self, url: &str, entry: &CachedImage) -> Result<(), ImageError> {
        tracing::debug!(url = %url, "Fetching image");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Status(status.as_u16()));
        }
        let bytes = read_limited(response, self.max_source_bytes).await?;

        let (max_width, max_height) = (self.max_width, self.max_height);
        let encoded = tokio::task::spawn_blocking(move || to_bilevel_gif(&bytes, max_width, max_height))
            .await
            .map_err(|e| ImageError::Encode(format!("transform task failed: {}", e)))??;

        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", entry.file_name, uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, &encoded).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &entry.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}
