//! Header manipulation.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers from upstream responses
//! - Drop `Content-Length`, since rewriting changes body size
//! - Select the request headers forwarded upstream

use axum::http::{header, HeaderMap, HeaderName};

/// Response headers that must not be copied onto the client response.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::CONTENT_LENGTH,
];

/// Request headers forwarded by the default fetcher.
pub const FORWARDED_REQUEST_HEADERS: [HeaderName; 3] =
    [header::ACCEPT, header::ACCEPT_LANGUAGE, header::REFERER];

/// Remove hop-by-hop and length headers in place.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers.remove("keep-alive");
}

/// Copy the allowlisted request headers.
pub fn forwarded_request_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for name in FORWARDED_REQUEST_HEADERS.iter() {
        if let Some(value) = inbound.get(name) {
            out.insert(name.clone(), value.clone());
        }
    }
    out
}
