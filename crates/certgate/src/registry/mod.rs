// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authoritative domain → provider index.
//!
//! Both maps sit behind one reader/writer lock. Registration only happens
//! during startup, so steady-state access is read-only. Entries are never
//! removed or replaced.

pub mod bootstrap;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::RegistryError;
use crate::provider::{CertificateBundle, CertificateProvider, DomainInfo};

#[derive(Default)]
struct Maps {
    providers: HashMap<String, Arc<dyn CertificateProvider>>,
    domains: HashMap<String, Arc<dyn CertificateProvider>>,
}

/// Maps each managed domain to exactly one provider.
#[derive(Default)]
pub struct ProviderRegistry {
    inner: RwLock<Maps>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider and claim all of its domains.
    ///
    /// All-or-nothing: on any error neither map is modified.
    pub fn register(&self, provider: Arc<dyn CertificateProvider>) -> Result<(), RegistryError> {
        let mut maps = self.inner.write();
        let name = provider.name().to_owned();

        if maps.providers.contains_key(&name) {
            return Err(RegistryError::DuplicateProvider(name));
        }

        for domain in provider.domains() {
            if let Some(existing) = maps.domains.get(domain) {
                return Err(RegistryError::DuplicateDomain {
                    domain: domain.clone(),
                    existing: existing.name().to_owned(),
                });
            }
        }

        provider
            .validate_configuration()
            .map_err(|source| RegistryError::InvalidConfiguration { provider: name.clone(), source })?;

        for domain in provider.domains() {
            maps.domains.insert(domain.clone(), Arc::clone(&provider));
        }
        tracing::info!(provider = %name, domains = provider.domains().len(), "provider registered");
        maps.providers.insert(name, provider);
        Ok(())
    }

    /// Provider claiming exactly `domain`. No wildcard expansion.
    pub fn resolve_domain(&self, domain: &str) -> Result<Arc<dyn CertificateProvider>, RegistryError> {
        self.inner
            .read()
            .domains
            .get(domain)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownDomain(domain.to_owned()))
    }

    pub fn get_provider(&self, name: &str) -> Result<Arc<dyn CertificateProvider>, RegistryError> {
        self.inner
            .read()
            .providers
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownProvider(name.to_owned()))
    }

    pub fn list_providers(&self) -> BTreeSet<String> {
        self.inner.read().providers.keys().cloned().collect()
    }

    pub fn list_domains(&self) -> BTreeSet<String> {
        self.inner.read().domains.keys().cloned().collect()
    }

    pub fn provider_count(&self) -> usize {
        self.inner.read().providers.len()
    }

    pub fn domain_count(&self) -> usize {
        self.inner.read().domains.len()
    }

    pub fn get_domain_info(&self, domain: &str) -> Option<DomainInfo> {
        let provider = self.inner.read().domains.get(domain).cloned()?;
        provider.domain_info(domain)
    }

    /// Domain metadata from every provider, sorted by domain name.
    pub fn list_all_domain_info(&self) -> Vec<DomainInfo> {
        let providers: Vec<_> = self.inner.read().providers.values().cloned().collect();
        let mut infos: Vec<DomainInfo> =
            providers.iter().flat_map(|p| p.list_domain_info()).collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Resolve `domain` and fetch its certificate from the owning provider.
    ///
    /// The lock is released before the upstream call.
    pub async fn retrieve_certificate(
        &self,
        domain: &str,
    ) -> Result<CertificateBundle, RegistryError> {
        let provider = self.resolve_domain(domain)?;
        provider
            .retrieve_certificate(domain)
            .await
            .map_err(|source| RegistryError::Upstream { domain: domain.to_owned(), source })
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
