//! Image caching subsystem.
//!
//! # Data Flow
//! ```text
//! HTML text + page URL
//!     → rewrite.rs (collect img[src], resolve against page URL)
//!     → cache.rs (content-addressed lookup; fetch on miss)
//!     → transform.rs (downscale, dither, 1-bit GIF)
//!     → rewrite.rs (swap src for /cached_image/{key}.gif)
//! ```
//!
//! # Design Decisions
//! - Cache directory is wiped at startup, never during operation
//! - Per-image failures are typed and contained in the rewrite loop
//! - CPU-bound transforms run on the blocking pool

pub mod cache;
pub mod rewrite;
pub mod transform;
pub mod types;

pub use cache::{cache_key, ImageCache};
pub use rewrite::{rewrite_images, RewriteLimits};
pub use types::{
    CachedImage, ImageError, CACHED_IMAGE_CONTENT_TYPE, CACHED_IMAGE_EXTENSION, CACHED_IMAGE_ROUTE,
};
