use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use claim_relayer::api::{create_router, AppState};
use claim_relayer::cli::{self, Cli, Commands};
use claim_relayer::config::Settings;
use claim_relayer::dispatcher::ClaimDispatcher;
use claim_relayer::logging::{init_logging, init_logging_simple};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load_from(&cli.config_dir)?;

    match cli.command {
        Some(Commands::CheckConfig { check_rpc }) => {
            init_logging_simple();
            cli::check_config(&settings, check_rpc).await?;
        }
        Some(Commands::Serve { host, port }) => {
            let mut settings = settings;
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            run_server(settings).await?;
        }
        None => run_server(settings).await?,
    }

    Ok(())
}

async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let _log_guard = init_logging(&settings.logging);

    // A bad configuration does not stop the process: claims answer with a
    // structured 500 and /readyz reports not ready.
    let relayer = settings
        .resolve()
        .and_then(|config| ClaimDispatcher::from_config(&config))
        .map(Arc::new);

    match &relayer {
        Ok(dispatcher) => info!(
            "Relayer ready: hot wallet {} using {}",
            dispatcher.signer_address(),
            dispatcher.strategy().name()
        ),
        Err(e) => error!("Relayer misconfigured, claims will fail: {}", e),
    }
    if settings.response.expose_diagnostics {
        warn!("Diagnostics are exposed in error responses; do not use in production");
    }

    let background = relayer.as_ref().ok().cloned();
    let state = AppState::new(relayer, settings.response.expose_diagnostics);
    let health = state.health.clone();
    let app = create_router(state, &settings.server.claim_path);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "Claim relayer listening on http://{}{}",
        addr, settings.server.claim_path
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(dispatcher) = background {
        let grace = Duration::from_secs(settings.server.shutdown_grace_secs);
        dispatcher.drain_background(grace).await;
    }

    health.metrics.log_status();
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining in-flight claims");
}
