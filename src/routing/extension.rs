//! Extension capability interface.
//!
//! An extension claims one domain suffix. It may also expose an override
//! status: while it reports `true` after handling a request, every later
//! request is routed to it regardless of host.

use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::http::ProxyRequest;
use crate::response::HandlerResponse;

/// Failure reported by an extension handler.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ExtensionError(pub String);

impl ExtensionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type ExtensionResult = Result<HandlerResponse, ExtensionError>;

/// A statically registered request handler.
pub trait Extension: Send + Sync {
    /// Unique name, as listed in `extensions.enabled`.
    fn name(&self) -> &str;

    /// Domain suffix this extension claims.
    fn domain(&self) -> &str;

    /// Produce a response for `request`.
    fn handle_request<'a>(&'a self, request: &'a ProxyRequest) -> BoxFuture<'a, ExtensionResult>;

    /// Whether the extension wants to capture all traffic.
    ///
    /// `None` means the extension has no override capability.
    fn override_status(&self) -> Option<bool> {
        None
    }
}

impl std::fmt::Debug for dyn Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name())
            .field("domain", &self.domain())
            .finish()
    }
}
