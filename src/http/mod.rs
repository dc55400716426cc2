//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout)
//!     → /cached_image/{file} → cached.rs (read from cache dir)
//!     → anything else → request.rs (buffer, absolute URL)
//!     → routing::Dispatcher → response::ResponseNormalizer
//!     → headers.rs (hop-by-hop stripped on upstream responses)
//!     → Send to client
//! ```

pub mod cached;
pub mod headers;
pub mod request;
pub mod server;

pub use request::{MakeRequestUuid, ProxyRequest, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
