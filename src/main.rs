mod bot;
mod config;
mod irc;
mod logging;
mod net;

use crate::config::{BotConfig, Cli, FileConfig};
use crate::irc::connection::{self, Session};
use crate::net::tls;
use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_from(config::normalize_args(std::env::args_os()));

    let file = match config::load_file_config(cli.config.as_deref()) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    logging::init_tracing(&file.logging.level);

    // Exit directly: a pending stdin read would otherwise keep the runtime
    // from shutting down. Background tasks are never joined.
    let code = match run(cli, file).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli, file: FileConfig) -> Result<()> {
    let config = Arc::new(BotConfig::resolve(cli, file)?);
    let server = &config.server;

    tls::install_crypto_provider();
    let identity = match &server.client_cert {
        Some(paths) if server.tls => Some(
            tls::load_client_identity(paths).context("Failed to load client certificate")?,
        ),
        _ => None,
    };
    let session_config =
        config::session_config(&config, identity).context("Invalid proxy URL")?;

    info!(
        address = %server.address,
        port = server.port,
        tls = server.tls,
        proxied = server.proxy.is_some(),
        "Connecting"
    );
    let session = connection::connect(session_config, bot::handlers(Arc::clone(&config)))
        .await
        .with_context(|| format!("Failed to connect to {}:{}", server.address, server.port))?;

    if config.interactive {
        wait_for_shutdown(session).await
    } else {
        finish(session).await
    }
}

async fn finish(session: Session) -> Result<()> {
    session.await.context("Session task panicked")??;
    info!("Disconnected");
    Ok(())
}

/// Interactive mode: run until SIGINT/SIGTERM, or until the session ends.
async fn wait_for_shutdown(session: Session) -> Result<()> {
    tokio::select! {
        signal = shutdown_signal() => {
            signal.context("Failed to listen for shutdown signals")?;
            info!("Shutting down");
            Ok(())
        }
        result = finish(session) => result,
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
