//! NoteHub web server
//!
//! Serves the NoteHub pages and a JSON proxy to the notes backend, with the
//! session-verifying route guard in front of every page.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use notehub_client::{ClientConfig, NotesClient};
use notehub_web::session::session_url_for;
use notehub_web::{router, AppState, GuardConfig, RouteGuard, RouteRules};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "notehub-web")]
#[command(about = "NoteHub web server with session-verifying route guard")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 3000, env = "NOTEHUB_WEB_PORT")]
    port: u16,

    /// Address to bind to
    #[arg(long, default_value = "0.0.0.0", env = "NOTEHUB_WEB_BIND")]
    bind: String,

    /// Base URL of the notes backend
    #[arg(long, env = "NOTEHUB_URL")]
    notehub_url: String,

    /// Bearer token for the notes backend
    #[arg(long, env = "NOTEHUB_TOKEN", hide_env_values = true)]
    notehub_token: String,

    /// Session check endpoint (defaults to {notehub-url}/auth/session)
    #[arg(long, env = "NOTEHUB_SESSION_URL")]
    session_url: Option<String>,

    /// Upper bound on each session check, in seconds
    #[arg(long, default_value_t = 5, env = "NOTEHUB_SESSION_TIMEOUT_SECS")]
    session_timeout_secs: u64,

    /// JSON file overriding the private/auth route lists
    #[arg(long, env = "NOTEHUB_ROUTES_CONFIG")]
    routes_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "notehub_web=info,notehub_client=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Notes backend client
    let client_config = ClientConfig::new(&cli.notehub_url, cli.notehub_token.clone())?;
    let session_url = match &cli.session_url {
        Some(url) => Url::parse(url).with_context(|| format!("Invalid session URL: {}", url))?,
        None => session_url_for(client_config.base_url()),
    };
    let notes = NotesClient::new(client_config)?;

    // Route guard
    let rules = match &cli.routes_config {
        Some(path) => RouteRules::load(path)?,
        None => RouteRules::default(),
    };
    let guard_config = GuardConfig {
        session_url,
        timeout: Duration::from_secs(cli.session_timeout_secs),
        rules,
    };
    tracing::info!("Session checks against {}", guard_config.session_url);
    let guard = Arc::new(RouteGuard::new(guard_config).context("Failed to build session client")?);

    let app = router(Arc::new(AppState { notes }), guard);

    // Parse bind address
    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port).parse()?;

    tracing::info!("Starting notehub-web on {}", addr);
    tracing::info!("Notes backend: {}", cli.notehub_url);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("notehub-web shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
