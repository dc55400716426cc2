//! Size-capped reads of origin bodies.

use bytes::{Bytes, BytesMut};
use thiserror::Error;

/// Failure reading an origin body.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("response body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error(transparent)]
    Read(#[from] reqwest::Error),
}

/// Read `response` to the end, giving up once more than `limit` bytes arrive.
///
/// A declared `Content-Length` over the limit is rejected before any body
/// bytes are read.
pub async fn read_limited(mut response: reqwest::Response, limit: usize) -> Result<Bytes, BodyError> {
    if let Some(declared) = response.content_length() {
        if declared > limit as u64 {
            return Err(BodyError::TooLarge { limit });
        }
    }

    let mut body = BytesMut::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(BodyError::TooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}
