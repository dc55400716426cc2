//! Extension lookup by name and host.
//!
//! # Responsibilities
//! - Hold extensions in registration order
//! - Match a host against domain suffixes (first registered wins)
//! - Resolve extensions by name for the override slot
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) suffix scan; registration order is the tie-break

use std::sync::Arc;

use crate::config::ConfigError;
use crate::routing::extension::Extension;

/// Ordered set of registered extensions.
#[derive(Default)]
pub struct ExtensionRegistry {
    extensions: Vec<Arc<dyn Extension>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `extension` after all existing ones.
    pub fn register(mut self, extension: Arc<dyn Extension>) -> Self {
        tracing::info!(
            extension = %extension.name(),
            domain = %extension.domain(),
            "Extension registered"
        );
        self.extensions.push(extension);
        self
    }

    /// Build a registry from configured names, picking implementations from
    /// `catalog`. Order follows `names`.
    pub fn from_names(names: &[String], catalog: Vec<Arc<dyn Extension>>) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for name in names {
            let extension = catalog
                .iter()
                .find(|ext| ext.name() == name)
                .cloned()
                .ok_or_else(|| ConfigError::UnknownExtension(name.clone()))?;
            registry = registry.register(extension);
        }
        Ok(registry)
    }

    /// Extension registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Extension>> {
        self.extensions.iter().find(|ext| ext.name() == name)
    }

    /// First extension whose domain is a suffix of `host` (port already removed).
    pub fn match_host(&self, host: &str) -> Option<&Arc<dyn Extension>> {
        let host = host.to_ascii_lowercase();
        self.extensions
            .iter()
            .find(|ext| host.ends_with(&ext.domain().to_ascii_lowercase()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.extensions.iter().map(|ext| ext.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}
