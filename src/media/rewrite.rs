//! `<img>` source rewriting.
//!
//! # Responsibilities
//! - Find every `img[src]` in a document
//! - Resolve sources against the page URL
//! - Swap each source for its cached 1-bit copy
//!
//! # Design Decisions
//! - The parsed tree is not `Send`, so parsing happens twice: once to collect
//!   sources, once to apply replacements after the async fetches complete
//! - A failed image keeps its original `src`; the page is still served
//! - Image resolution for one page is bounded by a time budget; images still
//!   pending when it runs out count as failed
//! - Identical URLs on one page are fetched once
//! - Bodies without document structure are written back as fragments, without
//!   the `html`/`head`/`body` wrappers the parser adds

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use kuchikiki::traits::TendrilSink;
use kuchikiki::NodeRef;
use url::Url;

use crate::config::ImageConfig;
use crate::media::cache::ImageCache;

/// Bounds on the image work done for a single page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteLimits {
    /// Images resolved at the same time.
    pub concurrency: usize,
    /// Total time allowed for resolving every image on the page.
    pub budget: Duration,
}

impl RewriteLimits {
    pub fn from_config(config: &ImageConfig) -> Self {
        Self {
            concurrency: config.fetch_concurrency.max(1),
            budget: Duration::from_secs(config.rewrite_budget_secs),
        }
    }
}

/// Resolve an `src` attribute value to an absolute, fetchable URL.
///
/// Returns `None` for `data:` URIs, unsupported schemes, and values that do
/// not parse.
pub fn resolve_source(base: &Url, src: &str) -> Option<Url> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }
    let url = base.join(src).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Whether `html` declares its own document structure.
fn is_full_document(html: &str) -> bool {
    let lower = html.to_ascii_lowercase();
    ["<!doctype", "<html", "<head", "<body"]
        .iter()
        .any(|tag| lower.contains(tag))
}

/// Serialize `document`, dropping parser-added wrappers when the input was a
/// fragment.
fn serialize(document: &NodeRef, fragment: bool) -> String {
    if !fragment {
        return document.to_string();
    }
    let mut out = String::new();
    for section in ["head", "body"] {
        if let Ok(element) = document.select_first(section) {
            for child in element.as_node().children() {
                out.push_str(&child.to_string());
            }
        }
    }
    out
}

/// Absolute URLs of every image referenced by `html`, deduplicated, in
/// document order.
pub fn collect_sources(html: &str, base: &Url) -> Vec<Url> {
    let document = kuchikiki::parse_html().one(html);
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for img in document.select("img").into_iter().flatten() {
        let attributes = img.attributes.borrow();
        let Some(src) = attributes.get("src") else {
            continue;
        };
        if let Some(url) = resolve_source(base, src) {
            if seen.insert(url.clone()) {
                sources.push(url);
            }
        }
    }
    sources
}

/// Reserialize `html` with every resolvable source replaced from `replacements`
/// (absolute URL → served URL).
pub fn apply_replacements(html: &str, base: &Url, replacements: &HashMap<String, String>) -> String {
    let document = kuchikiki::parse_html().one(html);

    for img in document.select("img").into_iter().flatten() {
        let mut attributes = img.attributes.borrow_mut();
        let replacement = attributes
            .get("src")
            .and_then(|src| resolve_source(base, src))
            .and_then(|url| replacements.get(url.as_str()));
        if let Some(served) = replacement {
            tracing::debug!(served = %served, "Replaced image URL");
            attributes.insert("src", served.clone());
        }
    }

    serialize(&document, !is_full_document(html))
}

/// Rewrite every image in `html` to its cached copy.
pub async fn rewrite_images(html: &str, base: &Url, cache: &ImageCache, limits: RewriteLimits) -> String {
    let sources = collect_sources(html, base);
    let total = sources.len();
    let deadline = tokio::time::Instant::now() + limits.budget;

    let mut pending = stream::iter(sources)
        .map(|url| async move {
            let result = cache.resolve(url.as_str()).await;
            (url, result)
        })
        .buffer_unordered(limits.concurrency.max(1));

    let mut replacements = HashMap::new();
    let mut finished = 0;
    loop {
        match tokio::time::timeout_at(deadline, pending.next()).await {
            Ok(Some((url, Ok(entry)))) => {
                finished += 1;
                replacements.insert(url.to_string(), entry.served_url());
            }
            Ok(Some((url, Err(e)))) => {
                finished += 1;
                tracing::warn!(url = %url, error = %e, "Failed to cache image");
            }
            Ok(None) => break,
            Err(_) => {
                tracing::warn!(
                    page = %base,
                    unresolved = total - finished,
                    budget_secs = limits.budget.as_secs(),
                    "Image budget exhausted; leaving remaining sources untouched"
                );
                break;
            }
        }
    }
    drop(pending);

    apply_replacements(html, base, &replacements)
}
