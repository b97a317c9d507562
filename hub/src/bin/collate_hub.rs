// hub/src/bin/collate_hub.rs
//
// Entrypoint: load config, start the pruner, serve the API, shut down
// cleanly on Ctrl+C/SIGTERM. Mirrors the teacher's CLI-over-env-config
// shape and the corpus's axum-service graceful-shutdown idiom.

use std::net::SocketAddr;

use clap::Parser;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use collate_hub::api::{create_router, AppState};
use collate_hub::config::Config;
use collate_hub::pruner;

#[derive(Parser)]
#[command(
    name = "collate-hub",
    about = "Privacy-preserving collective fraud-intelligence hub coordinator",
    version = env!("CARGO_PKG_VERSION"),
)]
struct Cli {
    #[arg(long, help = "Override HOST env var")]
    host: Option<String>,

    #[arg(long, help = "Override PORT env var")]
    port: Option<u16>,

    #[arg(long, help = "Validate configuration and exit without binding a socket")]
    check_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    collate_hub::logging::init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    if cli.check_config {
        println!("configuration OK");
        return Ok(());
    }

    info!(version = env!("CARGO_PKG_VERSION"), "starting collate-hub");

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = AppState::new(config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(pruner::run(state.pipeline.clone(), shutdown_rx));

    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = create_router(state).layer(TraceLayer::new_for_http()).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "listening");

    let shutdown_signal = async move {
        let ctrl_c = async {
            tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler")
                .recv()
                .await;
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("received Ctrl+C, shutting down"),
            _ = terminate => info!("received SIGTERM, shutting down"),
        }
        let _ = shutdown_tx.send(true);
    };

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal).await?;
    info!("shutdown complete");
    Ok(())
}
