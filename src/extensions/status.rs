//! Proxy status page, reachable from the legacy browser itself.

use futures_util::future::BoxFuture;

use crate::http::ProxyRequest;
use crate::response::HandlerResponse;
use crate::routing::{Extension, ExtensionResult};

pub const STATUS_DOMAIN: &str = "macproxy.status";

/// Renders a page listing enabled extensions and echoing the request.
pub struct StatusExtension {
    enabled: Vec<String>,
}

impl StatusExtension {
    pub fn new(enabled: Vec<String>) -> Self {
        Self { enabled }
    }

    fn render(&self, request: &ProxyRequest) -> String {
        let mut items = String::new();
        for name in &self.enabled {
            items.push_str(&format!("<li>{}</li>", escape(name)));
        }
        format!(
            "<html><head><title>Macproxy</title></head><body>\
             <h1>Macproxy {version}</h1>\
             <p>Requested: {url}</p>\
             <p>Your browser: {agent}</p>\
             <h2>Extensions</h2><ul>{items}</ul>\
             </body></html>",
            version = env!("CARGO_PKG_VERSION"),
            url = escape(request.url.as_str()),
            agent = escape(request.header("user-agent").unwrap_or("unknown")),
            items = items,
        )
    }
}

impl Extension for StatusExtension {
    fn name(&self) -> &str {
        "status"
    }

    fn domain(&self) -> &str {
        STATUS_DOMAIN
    }

    fn handle_request<'a>(&'a self, request: &'a ProxyRequest) -> BoxFuture<'a, ExtensionResult> {
        Box::pin(async move { Ok(HandlerResponse::html(self.render(request))) })
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
