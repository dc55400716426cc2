//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Capture requests, dispatch them, normalize the result
//! - Serve cached images
//! - Convert every failure into a response

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::cached::serve_cached_image;
use crate::http::request::{MakeRequestUuid, ProxyRequest};
use crate::lifecycle::{stopped, StopReason};
use crate::media::{ImageCache, RewriteLimits};
use crate::observability::metrics;
use crate::response::ResponseNormalizer;
use crate::routing::{Dispatcher, ExtensionRegistry};
use crate::transcode::Transcoder;
use crate::upstream::{build_client, DefaultFetcher};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub normalizer: Arc<ResponseNormalizer>,
    pub images: Arc<ImageCache>,
    pub max_body_bytes: usize,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    state: AppState,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and extensions.
    pub fn new(config: ProxyConfig, registry: ExtensionRegistry) -> Result<Self, reqwest::Error> {
        let client = build_client(&config.upstream)?;
        let images = Arc::new(ImageCache::new(&config.images, client.clone()));

        let normalizer = Arc::new(ResponseNormalizer::new(
            images.clone(),
            Transcoder::new(config.transcode.html_formatter),
            config.transcode.disable_char_conversion,
            RewriteLimits::from_config(&config.images),
        ));
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::new(registry),
            DefaultFetcher::new(client, config.upstream.max_response_bytes),
        ));

        let state = AppState {
            dispatcher,
            normalizer,
            images,
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            state,
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/cached_image/{filename}", get(serve_cached_image))
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.limits.request_timeout_secs,
                    ))),
            )
    }

    /// Router for in-process use (tests, embedding).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Serve until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<StopReason>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let reason = stopped(shutdown).await;
                tracing::info!(reason = %reason, "Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler: capture, dispatch, normalize.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();

    let request = match ProxyRequest::capture(request, state.max_body_bytes).await {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected request");
            let response = e.into_response();
            metrics::record_request("rejected", response.status().as_u16(), start_time);
            return response;
        }
    };

    tracing::debug!(
        request_id = %request.request_id(),
        method = %request.method,
        url = %request.url,
        "Proxying request"
    );

    let routed = match state.dispatcher.dispatch(&request).await {
        Ok(routed) => routed,
        Err(e) => {
            tracing::error!(request_id = %request.request_id(), error = %e, "Request failed");
            let response = e.into_response();
            metrics::record_request("error", response.status().as_u16(), start_time);
            return response;
        }
    };

    let response = state
        .normalizer
        .normalize(routed.response, &routed.base_url)
        .await;

    tracing::debug!(
        request_id = %request.request_id(),
        route = routed.route.label(),
        status = %response.status(),
        "Finished processing response"
    );
    metrics::record_request(routed.route.label(), response.status().as_u16(), start_time);
    response
}
