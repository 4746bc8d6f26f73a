// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Porkbun certificate provider.

pub mod bootstrap;
pub mod client;

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::ProviderError;
use crate::provider::{CertificateBundle, CertificateProvider, DomainInfo, DomainStatus};

pub use bootstrap::PorkbunBootstrap;
use client::PorkbunClient;

pub const PROVIDER_NAME: &str = "porkbun";

/// Serves certificates Porkbun generated for domains in one account.
pub struct PorkbunProvider {
    api_key: String,
    secret_key: String,
    domains: Vec<String>,
    domain_infos: HashMap<String, DomainInfo>,
    client: PorkbunClient,
}

impl PorkbunProvider {
    pub fn new(api_url: &str, api_key: &str, secret_key: &str, domains: Vec<String>) -> Self {
        Self {
            api_key: api_key.to_owned(),
            secret_key: secret_key.to_owned(),
            domains,
            domain_infos: HashMap::new(),
            client: PorkbunClient::new(api_url, api_key, secret_key),
        }
    }

    /// Attach metadata gathered during bootstrap, keyed by domain name.
    pub fn with_domain_infos(mut self, infos: Vec<DomainInfo>) -> Self {
        self.domain_infos = infos.into_iter().map(|info| (info.name.clone(), info)).collect();
        self
    }

    fn manages(&self, domain: &str) -> bool {
        self.domains.iter().any(|d| d == domain)
    }
}

#[async_trait::async_trait]
impl CertificateProvider for PorkbunProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn domains(&self) -> &[String] {
        &self.domains
    }

    fn domain_info(&self, domain: &str) -> Option<DomainInfo> {
        if let Some(info) = self.domain_infos.get(domain) {
            return Some(info.clone());
        }
        self.manages(domain)
            .then(|| DomainInfo::basic(domain, PROVIDER_NAME, DomainStatus::Unknown))
    }

    async fn retrieve_certificate(&self, domain: &str) -> Result<CertificateBundle, ProviderError> {
        if !self.manages(domain) {
            return Err(ProviderError::NotManaged(domain.to_owned()));
        }

        let ssl = self.client.retrieve_ssl(domain).await?;
        tracing::debug!(domain, "retrieved certificate from porkbun");
        Ok(CertificateBundle {
            certificate_chain: Bytes::from(ssl.certificate_chain),
            private_key: Bytes::from(ssl.private_key),
        })
    }

    fn validate_configuration(&self) -> Result<(), ProviderError> {
        let mut missing = Vec::new();
        if self.api_key.is_empty() {
            missing.push("api-key");
        }
        if self.secret_key.is_empty() {
            missing.push("secret-key");
        }
        // An empty domain list is allowed here; discovery fills it in.
        if !missing.is_empty() {
            return Err(ProviderError::MissingCredentials {
                provider: "Porkbun".to_owned(),
                fields: missing,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
