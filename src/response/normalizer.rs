//! Response normalization and content rewriting.
//!
//! # Responsibilities
//! - Canonicalize handler output into (content, status, headers)
//! - Route by `Content-Type`: HTML gets image rewriting then transcoding,
//!   other text gets transcoding, everything else passes through
//! - Reassemble the client response with every original header
//!
//! # Design Decisions
//! - Handler-built responses skip all processing
//! - Binary payloads are never decoded
//! - A rewritten body loses any declared `Content-Length`; the server frames
//!   the new body itself

use std::sync::Arc;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use url::Url;

use crate::media::{rewrite_images, ImageCache, RewriteLimits};
use crate::response::types::{CanonicalResponse, Content, HandlerResponse};
use crate::transcode::{TextKind, Transcoder};

/// Processing branch chosen from the declared content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    Html,
    Text,
    Other,
}

impl ContentClass {
    /// Classify a lower-cased `Content-Type` value by prefix.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("text/html") {
            ContentClass::Html
        } else if content_type.starts_with("text/") {
            ContentClass::Text
        } else {
            ContentClass::Other
        }
    }
}

/// Turns handler output into the final client response.
pub struct ResponseNormalizer {
    images: Arc<ImageCache>,
    transcoder: Transcoder,
    disable_char_conversion: bool,
    limits: RewriteLimits,
}

impl ResponseNormalizer {
    pub fn new(
        images: Arc<ImageCache>,
        transcoder: Transcoder,
        disable_char_conversion: bool,
        limits: RewriteLimits,
    ) -> Self {
        Self {
            images,
            transcoder,
            disable_char_conversion,
            limits,
        }
    }

    /// Normalize `response`, resolving relative image sources against `base`.
    pub async fn normalize(&self, response: HandlerResponse, base: &Url) -> Response {
        match CanonicalResponse::from_handler(response) {
            Ok(canonical) => self.transform(canonical, base).await.into_response(),
            Err(complete) => {
                tracing::debug!("Handler returned a complete response; passing through");
                complete
            }
        }
    }

    /// Apply the content-type specific rewrites to a canonical response.
    pub async fn transform(&self, mut canonical: CanonicalResponse, base: &Url) -> CanonicalResponse {
        let content_type = canonical.content_type();
        let class = ContentClass::from_content_type(&content_type);
        tracing::debug!(content_type = %content_type, class = ?class, "Processing response");

        canonical.content = match class {
            ContentClass::Html => {
                let text = canonical.content.into_text();
                let text = rewrite_images(&text, base, &self.images, self.limits).await;
                Content::Text(self.transcoder.transcode(
                    &text,
                    TextKind::Html,
                    self.disable_char_conversion,
                ))
            }
            ContentClass::Text => {
                let text = canonical.content.into_text();
                Content::Text(self.transcoder.transcode(
                    &text,
                    TextKind::Plain,
                    self.disable_char_conversion,
                ))
            }
            ContentClass::Other => canonical.content,
        };

        // The body is always sent whole.
        canonical.headers.remove(header::TRANSFER_ENCODING);
        if class != ContentClass::Other {
            canonical.headers.remove(header::CONTENT_LENGTH);
        }
        canonical
    }
}
