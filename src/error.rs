//! Request-level error taxonomy.
//!
//! Every failure that reaches the request boundary is converted into a
//! response here; nothing a single request does may take the process down.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::upstream::BodyError;

/// Marker prefixed to every diagnostic body so legacy users can spot proxy
/// failures among ordinary origin pages.
pub const ERROR_HEADER: &str = "[[Macproxy Encountered an Error]]";

/// Errors surfaced to the client as a response.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Outbound request failed (network error, timeout, redirect loop).
    #[error("{0}")]
    Upstream(String),

    /// An extension handler reported failure.
    #[error("extension '{name}' failed: {message}")]
    Extension { name: String, message: String },

    /// Inbound body exceeded the configured limit.
    #[error("request body exceeds {0} bytes")]
    BodyTooLarge(usize),

    /// The inbound request could not be turned into an absolute URL.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        ProxyError::Upstream(err.to_string())
    }
}

impl From<BodyError> for ProxyError {
    fn from(err: BodyError) -> Self {
        ProxyError::Upstream(err.to_string())
    }
}

impl ProxyError {
    /// HTTP status reported to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Upstream(_) | ProxyError::Extension { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, format!("{}{}", ERROR_HEADER, self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upstream_error_carries_marker_and_detail() {
        let response = ProxyError::Upstream("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            "[[Macproxy Encountered an Error]]connection refused"
        );
    }

    #[test]
    fn test_extension_error_is_server_error() {
        let err = ProxyError::Extension {
            name: "weather".into(),
            message: "boom".into(),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "extension 'weather' failed: boom");
    }

    #[test]
    fn test_oversized_origin_body_is_upstream_error() {
        let err: ProxyError = BodyError::TooLarge { limit: 64 }.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "response body exceeds 64 bytes");
    }

    #[test]
    fn test_body_limit_status() {
        assert_eq!(ProxyError::BodyTooLarge(10).status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
