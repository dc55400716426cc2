//! Response pipeline.
//!
//! # Data Flow
//! ```text
//! HandlerResponse (Raw | Parts | Complete)
//!     → types.rs (CanonicalResponse; Complete bypasses everything)
//!     → normalizer.rs (classify by Content-Type)
//!         text/html → media::rewrite_images → transcode (Html)
//!         text/*    → transcode (Plain)
//!         other     → untouched
//!     → axum Response
//! ```

pub mod normalizer;
pub mod types;

pub use normalizer::{ContentClass, ResponseNormalizer};
pub use types::{CanonicalResponse, Content, HandlerResponse};
