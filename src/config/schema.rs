//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// User-Agent presented to upstream origins unless overridden.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36";

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Outbound request settings shared by the default fetcher and image cache.
    pub upstream: UpstreamConfig,

    /// Image cache location and size caps.
    pub images: ImageConfig,

    /// Text/markup transcoding settings.
    pub transcode: TranscodeConfig,

    /// Extensions to register at startup, in priority order.
    pub extensions: ExtensionsConfig,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5001").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5001".to_string(),
        }
    }
}

impl ListenerConfig {
    /// Replace the port of the bind address, keeping the host part.
    pub fn set_port(&mut self, port: u16) {
        let host = self
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        self.bind_address = format!("{}:{}", host, port);
    }
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Spoofed User-Agent sent to every origin.
    pub user_agent: String,

    /// Total timeout for a single outbound request in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Maximum redirects followed per request.
    pub max_redirects: usize,

    /// Largest page body read from an origin, in bytes.
    pub max_response_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
            max_response_bytes: 16 * 1024 * 1024, // 16MB
        }
    }
}

/// Image cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Directory holding transformed images. Wiped at startup.
    pub cache_dir: String,

    /// Maximum output width in pixels.
    pub max_width: u32,

    /// Maximum output height in pixels.
    pub max_height: u32,

    /// Images fetched concurrently while rewriting a single page.
    pub fetch_concurrency: usize,

    /// Time a page may spend resolving its images, in seconds. Images still
    /// pending afterwards keep their original source.
    pub rewrite_budget_secs: u64,

    /// Largest source image read from an origin, in bytes.
    pub max_source_bytes: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            cache_dir: "cached_images".to_string(),
            max_width: 512,
            max_height: 342,
            fetch_concurrency: 4,
            rewrite_budget_secs: 20,
            max_source_bytes: 8 * 1024 * 1024, // 8MB
        }
    }
}

/// Serializer policy applied to non-ASCII characters left after folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HtmlFormatter {
    /// Leave remaining characters untouched.
    Minimal,
    /// Named entities for Latin-1, numeric references otherwise.
    Html,
    /// Numeric references for everything outside ASCII.
    #[default]
    Html5,
}

impl std::str::FromStr for HtmlFormatter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimal" => Ok(Self::Minimal),
            "html" => Ok(Self::Html),
            "html5" => Ok(Self::Html5),
            other => Err(format!("unknown html formatter '{}'", other)),
        }
    }
}

/// Transcoding configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TranscodeConfig {
    /// Entity policy for the markup serializer.
    pub html_formatter: HtmlFormatter,

    /// Skip folding of typographic characters to ASCII.
    pub disable_char_conversion: bool,
}

/// Extension registration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ExtensionsConfig {
    /// Extension names, in registration (and host-match) order.
    pub enabled: Vec<String>,
}

/// Limits on inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum buffered request body in bytes.
    pub max_body_bytes: usize,

    /// Deadline for a whole inbound request in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
            request_timeout_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter directive used when `RUST_LOG` is not set.
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "macproxy=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_legacy_screen() {
        let config = ProxyConfig::default();
        assert_eq!(config.images.max_width, 512);
        assert_eq!(config.images.max_height, 342);
        assert_eq!(config.transcode.html_formatter, HtmlFormatter::Html5);
        assert!(!config.transcode.disable_char_conversion);
        assert!(config.extensions.enabled.is_empty());
        assert!(config.images.rewrite_budget_secs < config.limits.request_timeout_secs);
    }

    #[test]
    fn test_partial_toml() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [images]
            max_width = 640

            [transcode]
            html_formatter = "minimal"

            [extensions]
            enabled = ["status"]
            "#,
        )
        .unwrap();
        assert_eq!(config.images.max_width, 640);
        assert_eq!(config.images.max_height, 342);
        assert_eq!(config.transcode.html_formatter, HtmlFormatter::Minimal);
        assert_eq!(config.extensions.enabled, vec!["status".to_string()]);
        assert_eq!(config.upstream.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_set_port() {
        let mut listener = ListenerConfig::default();
        listener.set_port(8080);
        assert_eq!(listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_formatter_from_str() {
        assert_eq!("HTML".parse::<HtmlFormatter>(), Ok(HtmlFormatter::Html));
        assert!("xhtml".parse::<HtmlFormatter>().is_err());
    }
}
