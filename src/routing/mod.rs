//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! ProxyRequest (absolute URL)
//!     → dispatcher.rs (override slot set?)
//!         yes → registry.rs lookup by name → extension handler
//!     → registry.rs (host suffix match, first registered wins)
//!         match → extension handler (may enable override)
//!     → upstream::DefaultFetcher
//!     → Routed { response, base_url }
//! ```
//!
//! # Design Decisions
//! - Extensions are registered at startup, immutable at runtime
//! - Deterministic: same registry and state always pick the same handler
//! - Only the dispatcher writes the override slot

pub mod dispatcher;
pub mod extension;
pub mod registry;

pub use dispatcher::{Dispatcher, OverrideState, Route, Routed, OVERRIDE_SCHEMES};
pub use extension::{Extension, ExtensionError, ExtensionResult};
pub use registry::ExtensionRegistry;
