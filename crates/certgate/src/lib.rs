// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Certgate: brokers registrar-held TLS certificates to token-scoped callers.

pub mod command;
pub mod config;
pub mod error;
pub mod provider;
pub mod registry;
pub mod session;
pub mod state;
pub mod timefmt;
pub mod token;
pub mod transport;

use std::sync::{Arc, Once};

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::ServeConfig;
use crate::registry::ProviderRegistry;
use crate::session::{spawn_sweeper, SessionTracker};
use crate::state::AppState;
use crate::transport::build_router;

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Safe to call multiple times; only the first call has effect.
pub fn ensure_crypto_provider() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Serve the HTTP API on an already bound listener until `shutdown`.
///
/// `registry` must already hold every provider; it is read-only from here on.
pub async fn run(
    config: ServeConfig,
    registry: Arc<ProviderRegistry>,
    listener: TcpListener,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let signing_key = config.signing_key().ok_or_else(|| {
        anyhow::anyhow!(
            "jwt secret key is required; use --jwt-secret-key or set JWT_SECRET_KEY"
        )
    })?;
    anyhow::ensure!(registry.domain_count() > 0, "no managed domains registered");

    let sessions = Arc::new(SessionTracker::with_ttl(config.session_ttl()));
    let state = Arc::new(AppState::new(Arc::clone(&registry), Arc::clone(&sessions), signing_key)?);

    let sweeper = spawn_sweeper(sessions, config.sweep_interval(), shutdown.clone());

    tracing::info!(
        addr = %listener.local_addr()?,
        providers = registry.provider_count(),
        domains = registry.domain_count(),
        "certgate listening"
    );
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await?;

    shutdown.cancel();
    let _ = sweeper.await;
    Ok(())
}
