//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, image caps > 0, address parses)
//! - Keep the image rewrite budget inside the request deadline
//! - Detect duplicate extension registrations
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("upstream.user_agent must not be empty")]
    EmptyUserAgent,

    #[error("images.cache_dir must not be empty")]
    EmptyCacheDir,

    #[error(
        "images.rewrite_budget_secs ({budget}) must be less than limits.request_timeout_secs ({deadline})"
    )]
    RewriteBudget { budget: u64, deadline: u64 },

    #[error("extension '{0}' is enabled more than once")]
    DuplicateExtension(String),
}

/// Check a parsed configuration, collecting every violation.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let nonzero: [(&'static str, u64); 10] = [
        ("upstream.timeout_secs", config.upstream.timeout_secs),
        ("upstream.connect_timeout_secs", config.upstream.connect_timeout_secs),
        ("upstream.max_response_bytes", config.upstream.max_response_bytes as u64),
        ("images.max_width", config.images.max_width.into()),
        ("images.max_height", config.images.max_height.into()),
        ("images.fetch_concurrency", config.images.fetch_concurrency as u64),
        ("images.rewrite_budget_secs", config.images.rewrite_budget_secs),
        ("images.max_source_bytes", config.images.max_source_bytes as u64),
        ("limits.max_body_bytes", config.limits.max_body_bytes as u64),
        ("limits.request_timeout_secs", config.limits.request_timeout_secs),
    ];
    for (field, value) in nonzero {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    let (budget, deadline) = (
        config.images.rewrite_budget_secs,
        config.limits.request_timeout_secs,
    );
    if budget >= deadline {
        errors.push(ValidationError::RewriteBudget { budget, deadline });
    }

    if config.upstream.user_agent.trim().is_empty() {
        errors.push(ValidationError::EmptyUserAgent);
    }

    if config.images.cache_dir.trim().is_empty() {
        errors.push(ValidationError::EmptyCacheDir);
    }

    let mut seen = HashSet::new();
    for name in &config.extensions.enabled {
        if !seen.insert(name.as_str()) {
            errors.push(ValidationError::DuplicateExtension(name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
