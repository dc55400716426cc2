//! Static serving of cached images.

use std::path::Path;

use axum::{
    extract::{Path as UrlPath, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::server::AppState;
use crate::media::CACHED_IMAGE_CONTENT_TYPE;

/// Whether `name` is a plain file name inside the cache directory.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

/// `GET /cached_image/{filename}`.
pub async fn serve_cached_image(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> Response {
    if !is_safe_file_name(&filename) {
        tracing::warn!(filename = %filename, "Rejected cached image name");
        return StatusCode::NOT_FOUND.into_response();
    }

    match read_entry(state.images.dir(), &filename).await {
        Some(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, CACHED_IMAGE_CONTENT_TYPE)],
            bytes,
        )
            .into_response(),
        None => {
            tracing::debug!(filename = %filename, "Cached image not found");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn read_entry(dir: &Path, filename: &str) -> Option<Vec<u8>> {
    tokio::fs::read(dir.join(filename)).await.ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_file_names() {
        assert!(is_safe_file_name("0123abcdef.gif"));
        assert!(!is_safe_file_name("../secret"));
        assert!(!is_safe_file_name(".hidden.tmp"));
        assert!(!is_safe_file_name("a/b.gif"));
        assert!(!is_safe_file_name(""));
    }
}
