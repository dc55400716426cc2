//! Startup orchestration.
//!
//! # Responsibilities
//! - Reset the image cache directory
//! - Build the extension registry from configuration
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - No cached image survives a restart

use std::io;
use std::path::Path;

use tokio::net::TcpListener;

use crate::config::{ConfigError, ProxyConfig};
use crate::extensions;
use crate::routing::ExtensionRegistry;

/// Remove and recreate the cache directory.
pub fn reset_cache_dir(dir: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    std::fs::create_dir_all(dir)?;
    tracing::info!(path = %dir.display(), "Image cache cleared");
    Ok(())
}

/// Register the configured extensions in configured order.
pub fn build_registry(config: &ProxyConfig) -> Result<ExtensionRegistry, ConfigError> {
    let registry =
        ExtensionRegistry::from_names(&config.extensions.enabled, extensions::catalog(config))?;
    if registry.is_empty() {
        tracing::info!("Running without extensions");
    } else {
        tracing::info!(extensions = ?registry.names(), "Enabled extensions");
    }
    Ok(registry)
}

/// Bind the configured listener address.
pub async fn bind(config: &ProxyConfig) -> io::Result<TcpListener> {
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");
    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_cache_dir_wipes_entries() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("cached_images");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("old.gif"), b"GIF89a").unwrap();

        reset_cache_dir(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_reset_cache_dir_creates_missing() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("a").join("b");
        reset_cache_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_build_registry_rejects_unknown() {
        let mut config = ProxyConfig::default();
        config.extensions.enabled = vec!["status".into(), "nope".into()];
        assert!(matches!(
            build_registry(&config),
            Err(ConfigError::UnknownExtension(name)) if name == "nope"
        ));
    }
}
