//! Extension routing through the full server.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::IntoResponse;
use axum::Router;
use futures_util::future::BoxFuture;
use tower::ServiceExt;

use macproxy::extensions::StatusExtension;
use macproxy::http::{HttpServer, ProxyRequest};
use macproxy::lifecycle::{Shutdown, StopReason};
use macproxy::response::HandlerResponse;
use macproxy::routing::{Extension, ExtensionRegistry, ExtensionResult};

mod common;

/// Claims `portal.test`; keeps override while `capturing` is set.
struct Portal {
    capturing: AtomicBool,
    calls: AtomicUsize,
}

impl Extension for Portal {
    fn name(&self) -> &str {
        "portal"
    }

    fn domain(&self) -> &str {
        "portal.test"
    }

    fn handle_request<'a>(&'a self, request: &'a ProxyRequest) -> BoxFuture<'a, ExtensionResult> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut headers = HeaderMap::new();
            headers.insert(header::CONTENT_TYPE, "text/html".parse().unwrap());
            headers.insert("x-portal", "yes".parse().unwrap());
            let page = format!("<p>Portal \u{2014} {}</p>", request.url.path());
            Ok(HandlerResponse::with_headers(page, StatusCode::OK, headers))
        })
    }

    fn override_status(&self) -> Option<bool> {
        Some(self.capturing.load(Ordering::SeqCst))
    }
}

/// Returns a prebuilt response that must not be rewritten.
struct Prebuilt;

impl Extension for Prebuilt {
    fn name(&self) -> &str {
        "prebuilt"
    }

    fn domain(&self) -> &str {
        "prebuilt.test"
    }

    fn handle_request<'a>(&'a self, _request: &'a ProxyRequest) -> BoxFuture<'a, ExtensionResult> {
        Box::pin(async move {
            let response = (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html")],
                "<p>\u{201C}raw\u{201D}</p>",
            )
                .into_response();
            Ok(HandlerResponse::Complete(response))
        })
    }
}

async fn body_text(router: &Router, url: &str) -> (StatusCode, HeaderMap, String) {
    let request = Request::builder().uri(url).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_override_routes_all_hosts_until_released() {
    let portal = Arc::new(Portal {
        capturing: AtomicBool::new(true),
        calls: AtomicUsize::new(0),
    });
    let cache_dir = tempfile::tempdir().unwrap();
    let registry = ExtensionRegistry::new()
        .register(portal.clone())
        .register(Arc::new(Prebuilt));
    let server = HttpServer::new(common::test_config(cache_dir.path()), registry).unwrap();
    let router = server.router();
    let dispatcher = server.state().dispatcher.clone();

    let (status, headers, text) = body_text(&router, "http://www.portal.test/start").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["x-portal"], "yes");
    assert!(text.contains("<p>Portal -- /start</p>"), "{}", text);
    assert_eq!(dispatcher.active_override(), Some("portal".to_string()));

    // Another extension's host is still captured.
    let (_, _, text) = body_text(&router, "http://prebuilt.test/elsewhere").await;
    assert!(text.contains("Portal -- /elsewhere"), "{}", text);

    portal.capturing.store(false, Ordering::SeqCst);
    let (_, _, text) = body_text(&router, "http://prebuilt.test/last").await;
    assert!(text.contains("Portal -- /last"), "{}", text);
    assert_eq!(dispatcher.active_override(), None);

    let (_, _, text) = body_text(&router, "http://prebuilt.test/").await;
    assert_eq!(text, "<p>\u{201C}raw\u{201D}</p>");
    assert_eq!(portal.calls.load(Ordering::SeqCst), 3);
}

/// Declares a `Content-Length` for the body it produced, before rewriting.
struct PreSized;

impl Extension for PreSized {
    fn name(&self) -> &str {
        "sized"
    }

    fn domain(&self) -> &str {
        "sized.test"
    }

    fn handle_request<'a>(&'a self, _request: &'a ProxyRequest) -> BoxFuture<'a, ExtensionResult> {
        Box::pin(async move {
            let page = "<p>\u{2014}</p>";
            let mut headers = HeaderMap::new();
            headers.insert(header::CONTENT_TYPE, "text/html".parse().unwrap());
            headers.insert(header::CONTENT_LENGTH, page.len().into());
            Ok(HandlerResponse::with_headers(page, StatusCode::OK, headers))
        })
    }
}

/// A proxy serving on a real socket.
struct RunningProxy {
    addr: std::net::SocketAddr,
    shutdown: Shutdown,
    handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl RunningProxy {
    async fn start(registry: ExtensionRegistry, cache_dir: &std::path::Path) -> Self {
        let mut config = common::test_config(cache_dir);
        config.extensions.enabled = registry.names().into_iter().map(String::from).collect();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Shutdown::new();
        let server = HttpServer::new(config, registry).unwrap();
        let server_shutdown = shutdown.subscribe();
        let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });
        Self {
            addr,
            shutdown,
            handle,
        }
    }

    fn client(&self, user_agent: &str) -> reqwest::Client {
        reqwest::Client::builder()
            .proxy(reqwest::Proxy::http(format!("http://{}", self.addr)).unwrap())
            .user_agent(user_agent)
            .build()
            .unwrap()
    }

    async fn stop(self) {
        self.shutdown.trigger(StopReason::Requested);
        let result = tokio::time::timeout(Duration::from_secs(5), self.handle).await;
        assert!(matches!(result, Ok(Ok(Ok(())))));
    }
}

#[tokio::test]
async fn test_status_page_through_real_listener() {
    let cache_dir = tempfile::tempdir().unwrap();
    let registry = ExtensionRegistry::new()
        .register(Arc::new(StatusExtension::new(vec!["status".to_string()])));
    let proxy = RunningProxy::start(registry, cache_dir.path()).await;

    let client = proxy.client("MacWeb/2.0");
    let response = client
        .get("http://macproxy.status/")
        .send()
        .await
        .expect("proxy unreachable");

    assert_eq!(response.status(), 200);
    let page = response.text().await.unwrap();
    assert!(page.contains("<li>status</li>"), "{}", page);
    assert!(page.contains("MacWeb/2.0"), "{}", page);

    drop(client);
    proxy.stop().await;
}

#[tokio::test]
async fn test_extension_content_length_is_reframed_after_rewrite() {
    let cache_dir = tempfile::tempdir().unwrap();
    let registry = ExtensionRegistry::new().register(Arc::new(PreSized));
    let proxy = RunningProxy::start(registry, cache_dir.path()).await;

    let client = proxy.client("MacWeb/2.0");
    let response = client
        .get("http://sized.test/")
        .send()
        .await
        .expect("response must arrive intact");
    assert_eq!(response.status(), 200);
    let declared = response.content_length();
    let body = response.text().await.expect("body must arrive intact");

    assert_eq!(body, "<p>--</p>");
    assert_eq!(declared, Some(body.len() as u64));

    drop(client);
    proxy.stop().await;
}
