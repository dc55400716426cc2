//! Fallback path: plain upstream fetch.
//!
//! # Responsibilities
//! - Downgrade `https` targets to `http`
//! - Forward the header allowlist; User-Agent comes from the shared client
//! - POST forwards the raw body and its Content-Type; everything else is a GET
//! - Return the upstream status and headers for normalization
//! - Refuse bodies larger than `upstream.max_response_bytes`
//!
//! # Design Decisions
//! - Origins that only speak HTTPS fail here; the downgrade is kept so
//!   legacy clients never need a TLS handshake
//! - Non-2xx upstream statuses are returned, not treated as errors

use axum::http::{header, Method};
use url::Url;

use crate::error::ProxyError;
use crate::http::headers::{forwarded_request_headers, strip_hop_by_hop};
use crate::http::ProxyRequest;
use crate::response::HandlerResponse;
use crate::upstream::body::read_limited;

/// Force plain HTTP for an outbound URL.
pub fn downgrade_scheme(url: &Url) -> Url {
    let mut downgraded = url.clone();
    if downgraded.scheme() == "https" && downgraded.set_scheme("http").is_err() {
        tracing::warn!(url = %url, "Could not downgrade scheme");
    }
    downgraded
}

/// Performs the outbound request when no extension claims a host.
#[derive(Clone)]
pub struct DefaultFetcher {
    client: reqwest::Client,
    max_response_bytes: usize,
}

impl DefaultFetcher {
    pub fn new(client: reqwest::Client, max_response_bytes: usize) -> Self {
        Self {
            client,
            max_response_bytes,
        }
    }

    /// Fetch `url` on behalf of `request`.
    pub async fn fetch(&self, request: &ProxyRequest, url: &Url) -> Result<HandlerResponse, ProxyError> {
        let headers = forwarded_request_headers(&request.headers);

        let builder = if request.method == Method::POST {
            let mut builder = self
                .client
                .post(url.clone())
                .headers(headers)
                .body(request.body.clone());
            if let Some(content_type) = request.headers.get(header::CONTENT_TYPE) {
                builder = builder.header(header::CONTENT_TYPE, content_type.clone());
            }
            builder
        } else {
            self.client.get(url.clone()).headers(headers)
        };

        tracing::debug!(request_id = %request.request_id(), url = %url, "Sending request");
        let response = builder.send().await?;

        let status = response.status();
        let mut headers = response.headers().clone();
        strip_hop_by_hop(&mut headers);
        let content = read_limited(response, self.max_response_bytes).await?;

        tracing::debug!(
            request_id = %request.request_id(),
            status = %status,
            bytes = content.len(),
            "Upstream responded"
        );
        Ok(HandlerResponse::with_headers(content, status, headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downgrade_scheme() {
        let url = Url::parse("https://secure.example.com:8443/a?b=c").unwrap();
        assert_eq!(
            downgrade_scheme(&url).as_str(),
            "http://secure.example.com:8443/a?b=c"
        );
    }

    #[test]
    fn test_downgrade_only_touches_https() {
        let http = Url::parse("http://example.com/").unwrap();
        assert_eq!(downgrade_scheme(&http), http);
        let ftp = Url::parse("ftp://example.com/file").unwrap();
        assert_eq!(downgrade_scheme(&ftp), ftp);
    }

    #[tokio::test]
    async fn test_network_failure_is_upstream_error() {
        let fetcher = DefaultFetcher::new(reqwest::Client::new(), 1024);
        let request = ProxyRequest {
            method: Method::GET,
            url: Url::parse("http://127.0.0.1:9/").unwrap(),
            headers: Default::default(),
            body: Default::default(),
        };
        let err = fetcher.fetch(&request, &request.url).await.unwrap_err();
        assert!(matches!(err, ProxyError::Upstream(_)));
    }
}
