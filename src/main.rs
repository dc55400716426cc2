//! Macproxy
//!
//! An HTTP proxy that lets legacy browsers use the modern web.
//!
//! # Architecture Overview
//!
//! ```text
//!   Legacy browser                         macproxy
//!   ─────────────▶ http::server ──▶ routing::Dispatcher ──┬─▶ override extension
//!                                                          ├─▶ host-matched extension
//!                                                          └─▶ upstream::DefaultFetcher ──▶ origin
//!                                                 │
//!                                                 ▼
//!                                   response::ResponseNormalizer
//!                                     text/html → media (1-bit image cache) → transcode
//!                                     text/*    → transcode
//!   ◀───────────────────────────────  other     → untouched
//!
//!   GET /cached_image/{file} ──▶ http::cached (reads the cache directory)
//! ```

use std::path::{Path, PathBuf};

use clap::Parser;

use macproxy::config::{read_config, validate_config, ConfigError, HtmlFormatter, ProxyConfig};
use macproxy::http::HttpServer;
use macproxy::lifecycle::{signals, startup, Shutdown};
use macproxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "macproxy", version)]
#[command(about = "HTTP proxy that makes the modern web readable on legacy browsers", long_about = None)]
struct Cli {
    /// TOML configuration file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port number the web server will run on
    #[arg(long)]
    port: Option<u16>,

    /// Spoof as a particular web browser, e.g. "Mozilla/5.0"
    #[arg(long)]
    user_agent: Option<String>,

    /// Entity policy for rewritten markup: minimal, html or html5
    #[arg(long)]
    html_formatter: Option<HtmlFormatter>,

    /// Disable the conversion of common typographic characters to ASCII
    #[arg(long)]
    disable_char_conversion: bool,

    /// Maximum width of cached images
    #[arg(long)]
    max_image_width: Option<u32>,

    /// Maximum height of cached images
    #[arg(long)]
    max_image_height: Option<u32>,

    /// Directory for cached images (cleared at startup)
    #[arg(long)]
    cache_dir: Option<String>,

    /// Enable an extension; repeat to enable several, in priority order
    #[arg(long = "extension")]
    extensions: Vec<String>,
}

impl Cli {
    fn apply(&self, config: &mut ProxyConfig) {
        if let Some(port) = self.port {
            config.listener.set_port(port);
        }
        if let Some(user_agent) = &self.user_agent {
            config.upstream.user_agent = user_agent.clone();
        }
        if let Some(formatter) = self.html_formatter {
            config.transcode.html_formatter = formatter;
        }
        if self.disable_char_conversion {
            config.transcode.disable_char_conversion = true;
        }
        if let Some(width) = self.max_image_width {
            config.images.max_width = width;
        }
        if let Some(height) = self.max_image_height {
            config.images.max_height = height;
        }
        if let Some(dir) = &self.cache_dir {
            config.images.cache_dir = dir.clone();
        }
        if !self.extensions.is_empty() {
            config.extensions.enabled = self.extensions.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => ProxyConfig::default(),
    };
    cli.apply(&mut config);

    logging::init_logging(&config.observability.log_level);
    tracing::info!("macproxy v{} starting", env!("CARGO_PKG_VERSION"));

    validate_config(&config).map_err(ConfigError::Validation)?;
    tracing::info!(
        bind_address = %config.listener.bind_address,
        html_formatter = ?config.transcode.html_formatter,
        disable_char_conversion = config.transcode.disable_char_conversion,
        max_image = %format!("{}x{}", config.images.max_width, config.images.max_height),
        "Configuration loaded"
    );

    startup::reset_cache_dir(Path::new(&config.images.cache_dir))?;
    let registry = startup::build_registry(&config)?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = startup::bind(&config).await?;
    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    let server = HttpServer::new(config, registry)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
