//! Request dispatch and the override state machine.
//!
//! # Responsibilities
//! - Pick the handling path in strict order: override, host match, default
//! - Own the single override slot and every transition of it
//! - Contain extension failures as request-level errors
//!
//! # Override transitions
//! ```text
//! empty ──host-matched ext reports true──▶ Some(ext)
//! Some(ext) ──ext reports false after handling──▶ empty
//! Some(ext) ──ext no longer registered──▶ empty (request re-routed)
//! ```
//!
//! # Design Decisions
//! - The slot is a mutex held only for single reads/writes, never across an
//!   await. Concurrent requests from different clients race on override
//!   semantics: whichever extension last enabled override captures everyone.
//! - Clearing is compare-and-clear so a stale request cannot wipe a newer
//!   override set by another extension.
//! - A failing handler never changes the slot.

use std::sync::{Arc, Mutex, PoisonError};

use url::Url;

use crate::error::ProxyError;
use crate::http::ProxyRequest;
use crate::observability::metrics;
use crate::response::HandlerResponse;
use crate::routing::extension::Extension;
use crate::routing::registry::ExtensionRegistry;
use crate::upstream::{downgrade_scheme, DefaultFetcher};

/// Schemes an override extension may handle.
pub const OVERRIDE_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

/// Process-wide single-slot override.
#[derive(Debug, Default)]
pub struct OverrideState {
    slot: Mutex<Option<String>>,
}

impl OverrideState {
    /// Name of the extension currently capturing traffic.
    pub fn active(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn enable(&self, name: &str) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(name.to_string());
    }

    /// Clear the slot if it still names `name`. Returns whether it did.
    fn clear_if(&self, name: &str) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_deref() == Some(name) {
            *slot = None;
            true
        } else {
            false
        }
    }
}

/// Which path handled a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Override(String),
    Extension(String),
    Default,
}

impl Route {
    /// Low-cardinality label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Route::Override(_) => "override",
            Route::Extension(_) => "extension",
            Route::Default => "default",
        }
    }
}

/// Handler output plus the URL relative image sources resolve against.
#[derive(Debug)]
pub struct Routed {
    pub route: Route,
    pub response: HandlerResponse,
    pub base_url: Url,
}

/// Decides which handler processes each request.
pub struct Dispatcher {
    registry: Arc<ExtensionRegistry>,
    overrides: OverrideState,
    fetcher: DefaultFetcher,
}

impl Dispatcher {
    pub fn new(registry: Arc<ExtensionRegistry>, fetcher: DefaultFetcher) -> Self {
        Self {
            registry,
            overrides: OverrideState::default(),
            fetcher,
        }
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Name of the extension holding the override, if any.
    pub fn active_override(&self) -> Option<String> {
        self.overrides.active()
    }

    /// Route `request` to the override extension, a host-matched extension,
    /// or the default fetcher, in that order.
    pub async fn dispatch(&self, request: &ProxyRequest) -> Result<Routed, ProxyError> {
        if let Some(routed) = self.dispatch_override(request).await? {
            return Ok(routed);
        }

        if let Some(extension) = self.registry.match_host(request.host()) {
            return self.dispatch_host_match(extension, request).await;
        }

        let url = downgrade_scheme(&request.url);
        tracing::info!(request_id = %request.request_id(), url = %url, "Handling default request");
        let response = self.fetcher.fetch(request, &url).await?;
        Ok(Routed {
            route: Route::Default,
            response,
            base_url: url,
        })
    }

    /// Step 1. `Ok(None)` means fall through to host matching.
    async fn dispatch_override(&self, request: &ProxyRequest) -> Result<Option<Routed>, ProxyError> {
        let Some(name) = self.overrides.active() else {
            return Ok(None);
        };
        tracing::debug!(request_id = %request.request_id(), extension = %name, "Override active");

        let Some(extension) = self.registry.get(&name) else {
            tracing::warn!(extension = %name, "Override extension not found; resetting override");
            if self.overrides.clear_if(&name) {
                metrics::record_override("reset");
            }
            return Ok(None);
        };

        let scheme = request.url.scheme();
        if !OVERRIDE_SCHEMES.contains(&scheme) {
            tracing::warn!(
                request_id = %request.request_id(),
                scheme = %scheme,
                extension = %name,
                "Unsupported scheme for override extension"
            );
            return Ok(None);
        }

        let response = invoke(extension.as_ref(), request).await?;
        if extension.override_status() == Some(false) && self.overrides.clear_if(&name) {
            tracing::info!(extension = %name, "Override disabled");
            metrics::record_override("disabled");
        }

        Ok(Some(Routed {
            route: Route::Override(name),
            response,
            base_url: request.url.clone(),
        }))
    }

    /// Step 2.
    async fn dispatch_host_match(
        &self,
        extension: &Arc<dyn Extension>,
        request: &ProxyRequest,
    ) -> Result<Routed, ProxyError> {
        tracing::info!(
            request_id = %request.request_id(),
            extension = %extension.name(),
            host = %request.host(),
            "Handling request with matching extension"
        );
        let response = invoke(extension.as_ref(), request).await?;

        if extension.override_status() == Some(true) {
            self.overrides.enable(extension.name());
            tracing::info!(extension = %extension.name(), "Override enabled");
            metrics::record_override("enabled");
        }

        Ok(Routed {
            route: Route::Extension(extension.name().to_string()),
            response,
            base_url: request.url.clone(),
        })
    }
}

async fn invoke(extension: &dyn Extension, request: &ProxyRequest) -> Result<HandlerResponse, ProxyError> {
    extension.handle_request(request).await.map_err(|e| {
        tracing::error!(
            request_id = %request.request_id(),
            extension = %extension.name(),
            error = %e,
            "Extension handler failed"
        );
        ProxyError::Extension {
            name: extension.name().to_string(),
            message: e.to_string(),
        }
    })
}
