// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup orchestration: turn configured bootstraps into registered providers.

use std::sync::Arc;

use crate::error::BootstrapError;
use crate::provider::porkbun::PorkbunBootstrap;
use crate::provider::ProviderBootstrap;
use crate::registry::ProviderRegistry;

/// Owns every known provider bootstrap and the registry they populate.
pub struct BootstrapManager {
    bootstraps: Vec<Box<dyn ProviderBootstrap>>,
    registry: Arc<ProviderRegistry>,
}

impl BootstrapManager {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { bootstraps: Vec::new(), registry }
    }

    /// Manager preloaded with every built-in provider bootstrap.
    pub fn with_default_bootstraps(registry: Arc<ProviderRegistry>) -> Self {
        let mut manager = Self::new(registry);
        manager.register_bootstrap(Box::new(PorkbunBootstrap::new()));
        manager
    }

    pub fn register_bootstrap(&mut self, bootstrap: Box<dyn ProviderBootstrap>) {
        self.bootstraps.push(bootstrap);
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Let every bootstrap attach its flags to `cmd`.
    pub fn register_flags(&self, cmd: clap::Command) -> clap::Command {
        self.bootstraps.iter().fold(cmd, |cmd, b| b.register_flags(cmd))
    }

    /// Feed parsed flag values back to every bootstrap.
    pub fn load_flags(&mut self, matches: &clap::ArgMatches) {
        for bootstrap in &mut self.bootstraps {
            bootstrap.load_flags(matches);
        }
    }

    /// Names of bootstraps that currently report themselves configured.
    pub fn configured_providers(&self) -> Vec<String> {
        self.bootstraps
            .iter()
            .filter(|b| b.is_configured())
            .map(|b| b.provider_name().to_owned())
            .collect()
    }

    /// Create and register a provider for every configured bootstrap.
    ///
    /// Bootstraps are processed in registration order. The first creation or
    /// registration failure aborts; providers registered before it stay in
    /// the registry. Returns the number of providers registered.
    pub async fn initialize_providers(&self) -> Result<usize, BootstrapError> {
        let mut registered = 0;

        for bootstrap in &self.bootstraps {
            let name = bootstrap.provider_name();
            if !bootstrap.is_configured() {
                tracing::debug!(provider = name, "provider not configured, skipping");
                continue;
            }

            let provider = bootstrap
                .create_provider()
                .await
                .map_err(|source| BootstrapError::Create { provider: name.to_owned(), source })?;

            self.registry
                .register(provider)
                .map_err(|source| BootstrapError::Register { provider: name.to_owned(), source })?;
            registered += 1;
        }

        if registered == 0 {
            return Err(BootstrapError::NoProvidersConfigured);
        }

        tracing::info!(
            providers = registered,
            domains = self.registry.domain_count(),
            "certificate providers initialized"
        );
        Ok(registered)
    }
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
