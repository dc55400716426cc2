//! Macproxy library: an HTTP intermediary that rewrites the modern web for
//! legacy browsers.

pub mod config;
pub mod error;
pub mod extensions;
pub mod http;
pub mod lifecycle;
pub mod media;
pub mod observability;
pub mod response;
pub mod routing;
pub mod transcode;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
