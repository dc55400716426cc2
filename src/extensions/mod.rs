//! Extensions compiled into this build.
//!
//! Each implements [`crate::routing::Extension`]; `extensions.enabled` in the
//! configuration selects which of them are registered, and in what order.

pub mod status;

use std::sync::Arc;

use crate::config::ProxyConfig;
use crate::routing::Extension;

pub use status::StatusExtension;

/// Every extension available for registration.
pub fn catalog(config: &ProxyConfig) -> Vec<Arc<dyn Extension>> {
    vec![Arc::new(StatusExtension::new(config.extensions.enabled.clone()))]
}
