//! Development server: serves the widget bundle next to a mock alert service.

mod mock;

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue},
    Router,
};
use clap::Parser;
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use crate::mock::MockSource;

#[derive(Parser, Debug)]
#[command(author, version, about = "AmberLoader dev server with a mock alert service")]
struct Args {
    /// Directory containing the built widget and demo page
    #[arg(long, default_value = "web")]
    dist: PathBuf,

    /// Index file served as fallback for missing routes
    #[arg(long, default_value = "index.html")]
    index: PathBuf,

    /// Address to bind (ip or host)
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// JSON alert feed to start from
    #[arg(long)]
    feed: Option<PathBuf>,

    /// Start with a synthetic alert live
    #[arg(long)]
    active: bool,
}

/// Directory being served plus the page used for unknown paths.
#[derive(Debug)]
struct Site {
    root: PathBuf,
    index: Option<PathBuf>,
}

impl Site {
    /// Creates `dist` if needed. The index is optional; without it unknown
    /// paths are plain 404s.
    fn locate(dist: &Path, index: &Path) -> Result<Self> {
        std::fs::create_dir_all(dist).with_context(|| format!("failed to create {dist:?}"))?;
        let root = dist
            .canonicalize()
            .with_context(|| format!("failed to locate {dist:?}"))?;
        let index = Some(root.join(index)).filter(|path| path.is_file());
        Ok(Self { root, index })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let site = Site::locate(&args.dist, &args.index)?;

    let source = match &args.feed {
        Some(path) => MockSource::from_file(path)?,
        None => MockSource::default(),
    };
    if args.active {
        source.activate();
    }

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("failed to parse bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind listener on {addr}"))?;

    let root = site.root.display();
    match &site.index {
        Some(index) => info!(%root, index = %index.display(), "serving on http://{addr}"),
        None => warn!(%root, "serving without index fallback on http://{addr}"),
    }
    info!(active = source.is_active(), "mock alert service ready");

    axum::serve(listener, build_app(site, source).into_make_service())
        .with_graceful_shutdown(async {
            if signal::ctrl_c().await.is_ok() {
                warn!("received Ctrl+C, shutting down");
            }
        })
        .await
        .context("server exited with error")
}

fn build_app(site: Site, source: MockSource) -> Router {
    // Posters are probed cross-origin and must never be served from cache.
    let headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(TraceLayer::new_for_http())
        .into_inner();

    let assets = ServeDir::new(&site.root);
    let router = mock::router(source);
    let router = match site.index {
        Some(index) => router.fallback_service(assets.fallback(ServeFile::new(index))),
        None => router.fallback_service(assets),
    };
    router.layer(headers)
}
