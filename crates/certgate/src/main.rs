// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use tracing::error;
use tracing_subscriber::EnvFilter;

use certgate::config::{parse_with_bootstraps, LogArgs};
use certgate::registry::bootstrap::BootstrapManager;
use certgate::registry::ProviderRegistry;

#[tokio::main]
async fn main() {
    certgate::ensure_crypto_provider();

    let mut manager = BootstrapManager::with_default_bootstraps(Arc::new(ProviderRegistry::new()));
    let cli = match parse_with_bootstraps(&mut manager, std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    init_tracing(&cli.log);

    if let Err(e) = certgate::command::run(cli.command, &manager).await {
        error!("fatal: {e:#}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so command output on stdout stays pipeable.
fn init_tracing(log: &LogArgs) {
    use tracing_subscriber::fmt;

    let filter = EnvFilter::try_new(&log.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    match log.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).json().init(),
        _ => fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).init(),
    }
}
