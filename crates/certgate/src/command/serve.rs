// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ServeConfig;
use crate::registry::bootstrap::BootstrapManager;

/// Bring up providers and serve until SIGTERM or SIGINT.
pub async fn run(config: ServeConfig, manager: &BootstrapManager) -> anyhow::Result<()> {
    // Fail on a missing key before contacting any registrar.
    anyhow::ensure!(
        config.signing_key().is_some(),
        "jwt secret key is required; use --jwt-secret-key or set JWT_SECRET_KEY"
    );

    manager.initialize_providers().await?;

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.with_context(|| format!("failed to bind {addr}"))?;

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    crate::run(config, Arc::clone(manager.registry()), listener, shutdown).await?;
    info!("certgate stopped");
    Ok(())
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        let mut sigint =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()).ok();

        tokio::select! {
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGTERM");
            }
            _ = async {
                if let Some(ref mut s) = sigint { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGINT");
            }
            _ = shutdown.cancelled() => return,
        }
        shutdown.cancel();
    });
}
