//! arr-warden - Language-policy warden for Sonarr/Radarr imports
//!
//! Receives import webhooks, checks the imported file against the
//! per-tag/per-path language profiles, and remediates non-compliant
//! files against the backend's API (delete, re-monitor, search).

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arr_warden::config::{ConfigFormat, ConfigSource};
use arr_warden::store::ProfileStore;
use arr_warden::{build_router, net, watch, AppState};

/// Command-line arguments for arr-warden
#[derive(Parser, Debug)]
#[command(name = "arr-warden")]
#[command(about = "Language-policy warden for Sonarr/Radarr import webhooks")]
#[command(version)]
struct Args {
    /// Profile file format
    #[arg(short, long, value_enum, default_value_t = ConfigFormat::Yaml, env = "WARDEN_FORMAT")]
    format: ConfigFormat,

    /// Profile file path (defaults to profiles.<format> in the working directory)
    #[arg(short, long, env = "WARDEN_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "WARDEN_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arr_warden=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Log build identification immediately after tracing init
    info!(
        "Starting arr-warden v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(format!("profiles.{}", args.format.extension())));
    info!("Profile file: {} ({})", config_path.display(), args.format);

    // An unreadable profile file is the one fatal startup condition.
    let source = ConfigSource::new(config_path, args.format);
    let store = Arc::new(
        ProfileStore::open(source).context("Failed to load profile configuration")?,
    );
    info!("Loaded {} instance(s)", store.count());

    // Dropping the watcher stops change notifications; hold it for
    // the life of the server.
    let _watcher =
        watch::spawn(Arc::clone(&store)).context("Failed to watch profile file")?;

    let app = build_router(AppState::new(store));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    match net::outbound_ip() {
        Ok(ip) => info!("use http://{}:{}/webhook to send webhooks", ip, args.port),
        Err(e) => warn!(error = %e, "could not determine outbound address"),
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
