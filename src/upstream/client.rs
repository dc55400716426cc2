//! Shared outbound HTTP client.

use std::time::Duration;

use reqwest::redirect::Policy;

use crate::config::UpstreamConfig;

/// Build the client used for page and image fetches.
///
/// Every outbound request carries the configured User-Agent and is bounded
/// by the configured timeouts.
pub fn build_client(config: &UpstreamConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .build()
}
