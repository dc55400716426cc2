//! Handler result shapes.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

/// What an extension handler or the default fetcher produces.
#[derive(Debug)]
pub enum HandlerResponse {
    /// Body only: status 200, no headers.
    Raw(Bytes),
    /// Body with status and (possibly empty) headers.
    Parts {
        content: Bytes,
        status: StatusCode,
        headers: HeaderMap,
    },
    /// A response the handler built itself; forwarded untouched.
    Complete(Response),
}

impl HandlerResponse {
    pub fn with_status(content: impl Into<Bytes>, status: StatusCode) -> Self {
        HandlerResponse::Parts {
            content: content.into(),
            status,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_headers(content: impl Into<Bytes>, status: StatusCode, headers: HeaderMap) -> Self {
        HandlerResponse::Parts {
            content: content.into(),
            status,
            headers,
        }
    }

    /// HTML body with status 200.
    pub fn html(content: impl Into<Bytes>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
        Self::with_headers(content, StatusCode::OK, headers)
    }
}

impl From<Bytes> for HandlerResponse {
    fn from(content: Bytes) -> Self {
        HandlerResponse::Raw(content)
    }
}

impl From<Response> for HandlerResponse {
    fn from(response: Response) -> Self {
        HandlerResponse::Complete(response)
    }
}

/// Body of a canonical response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Binary(Bytes),
    Text(String),
}

impl Content {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Content::Binary(bytes) => bytes.as_ref(),
            Content::Text(text) => text.as_bytes(),
        }
    }

    /// Decode as UTF-8, replacing invalid sequences.
    pub fn into_text(self) -> String {
        match self {
            Content::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Content::Text(text) => text,
        }
    }
}

/// The single shape every rewriting stage operates on.
#[derive(Debug)]
pub struct CanonicalResponse {
    pub content: Content,
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl CanonicalResponse {
    /// Decompose a handler result.
    ///
    /// A `Complete` response is handed back unchanged as the error value.
    pub fn from_handler(response: HandlerResponse) -> Result<Self, Response> {
        match response {
            HandlerResponse::Raw(content) => Ok(Self {
                content: Content::Binary(content),
                status: StatusCode::OK,
                headers: HeaderMap::new(),
            }),
            HandlerResponse::Parts {
                content,
                status,
                headers,
            } => Ok(Self {
                content: Content::Binary(content),
                status,
                headers,
            }),
            HandlerResponse::Complete(response) => Err(response),
        }
    }

    /// Lower-cased `Content-Type`, empty when absent.
    pub fn content_type(&self) -> String {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_ascii_lowercase())
            .unwrap_or_default()
    }
}

impl IntoResponse for CanonicalResponse {
    fn into_response(self) -> Response {
        let body = match self.content {
            Content::Binary(bytes) => Body::from(bytes),
            Content::Text(text) => Body::from(text),
        };
        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        for (name, value) in self.headers.iter() {
            response.headers_mut().append(name.clone(), value.clone());
        }
        response
    }
}
