//! Outbound HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! ProxyRequest (no extension claimed it)
//!     → fetcher.rs (downgrade scheme, allowlist headers, GET/POST)
//!     → client.rs (shared reqwest client: User-Agent, timeouts, redirects)
//!     → HandlerResponse::Parts (status + headers + body)
//! ```
//!
//! # Design Decisions
//! - One client for pages and images, so both carry the same identity
//! - Every outbound call is bounded by the configured timeout
//! - Bodies are read through a size cap, never unbounded

pub mod body;
pub mod client;
pub mod fetcher;

pub use body::{read_limited, BodyError};
pub use client::build_client;
pub use fetcher::{downgrade_scheme, DefaultFetcher};
