//! Content transcoding for legacy renderers.
//!
//! # Data Flow
//! ```text
//! decoded text (after image rewriting for HTML)
//!     → charmap.rs (fold typographic characters, unless disabled)
//!     → entities.rs (formatter entity policy, HTML only)
//!     → text for the client
//! ```
//!
//! # Design Decisions
//! - Pure functions: no I/O, no shared state
//! - The disable flag is taken per call and passed through untouched
//! - Plain text never receives entity references

pub mod charmap;
pub mod entities;

use crate::config::HtmlFormatter;

/// What kind of text is being transcoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Html,
    Plain,
}

/// Boundary to the text/markup transcoding function.
#[derive(Debug, Clone, Copy)]
pub struct Transcoder {
    formatter: HtmlFormatter,
}

impl Transcoder {
    pub fn new(formatter: HtmlFormatter) -> Self {
        Self { formatter }
    }

    /// Transcode `text` for a legacy client.
    pub fn transcode(&self, text: &str, kind: TextKind, disable_char_conversion: bool) -> String {
        let folded = if disable_char_conversion {
            text.to_string()
        } else {
            charmap::fold_text(text)
        };

        match kind {
            TextKind::Html => entities::encode(&folded, self.formatter),
            TextKind::Plain => folded,
        }
    }
}
