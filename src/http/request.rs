//! Inbound request capture.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4)
//! - Buffer the body within the configured limit
//! - Reconstruct the absolute URL that is the unit of dispatch
//!
//! # Design Decisions
//! - Proxy clients send absolute-form targets; origin-form targets are
//!   rebuilt from the Host header over plain HTTP
//! - The captured request is immutable and shared by reference with handlers

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request};
use bytes::Bytes;
use tower_http::request_id::{MakeRequestId, RequestId};
use url::Url;
use uuid::Uuid;

use crate::error::ProxyError;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID generator for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// A fully buffered inbound request, as seen by extensions and the fetcher.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyRequest {
    /// Capture an axum request, buffering at most `max_body_bytes`.
    pub async fn capture(request: Request<Body>, max_body_bytes: usize) -> Result<Self, ProxyError> {
        let (parts, body) = request.into_parts();
        let url = absolute_url(&parts.uri, &parts.headers)?;
        let body = to_bytes(body, max_body_bytes)
            .await
            .map_err(|_| ProxyError::BodyTooLarge(max_body_bytes))?;

        Ok(Self {
            method: parts.method,
            url,
            headers: parts.headers,
            body,
        })
    }

    /// Host name without port, as used for extension matching.
    ///
    /// `Url` keeps the port separately, so this never includes it.
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Header value as a string, if present and valid.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn request_id(&self) -> &str {
        self.header(X_REQUEST_ID).unwrap_or("unknown")
    }
}

/// Build the absolute URL a request targets.
pub fn absolute_url(uri: &axum::http::Uri, headers: &HeaderMap) -> Result<Url, ProxyError> {
    if uri.scheme().is_some() {
        return Url::parse(&uri.to_string())
            .map_err(|e| ProxyError::InvalidRequest(format!("{}: {}", uri, e)));
    }

    let host = uri
        .authority()
        .map(|a| a.as_str().to_string())
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .ok_or_else(|| ProxyError::InvalidRequest("missing Host header".into()))?;
    let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    Url::parse(&format!("http://{}{}", host, path))
        .map_err(|e| ProxyError::InvalidRequest(format!("{}{}: {}", host, path, e)))
}
