// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Certificate provider capability and the per-provider bootstrap factory.
//!
//! A provider is one upstream registrar integration. It owns its credentials
//! and domain list and knows nothing about the registry it is placed in.

pub mod porkbun;
pub mod testing;

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Lifecycle status of a managed domain as reported by its provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainStatus {
    Active,
    Expired,
    /// Listed explicitly in configuration rather than discovered upstream.
    Configured,
    Unknown,
}

impl DomainStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Expired => "EXPIRED",
            Self::Configured => "CONFIGURED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DomainStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "ACTIVE" => Self::Active,
            "EXPIRED" => Self::Expired,
            "CONFIGURED" => Self::Configured,
            _ => Self::Unknown,
        })
    }
}

/// Metadata about one managed domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInfo {
    pub name: String,
    pub status: DomainStatus,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub auto_renew: bool,
}

impl DomainInfo {
    /// Minimal info for a domain with no recorded metadata.
    pub fn basic(name: impl Into<String>, provider: impl Into<String>, status: DomainStatus) -> Self {
        Self {
            name: name.into(),
            status,
            provider: provider.into(),
            created_at: None,
            expires_at: None,
            auto_renew: false,
        }
    }
}

/// PEM certificate chain and private key as returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateBundle {
    pub certificate_chain: Bytes,
    pub private_key: Bytes,
}

/// Capability implemented once per upstream registrar.
#[async_trait::async_trait]
pub trait CertificateProvider: Send + Sync {
    /// Unique provider name (e.g. "porkbun").
    fn name(&self) -> &str;

    /// Domains this provider manages, as concrete names.
    fn domains(&self) -> &[String];

    /// Metadata for one domain, or `None` if the domain is not managed here.
    fn domain_info(&self, domain: &str) -> Option<DomainInfo>;

    /// Metadata for every managed domain, in `domains()` order.
    fn list_domain_info(&self) -> Vec<DomainInfo> {
        self.domains().iter().filter_map(|d| self.domain_info(d)).collect()
    }

    /// Fetch the certificate chain and private key for `domain` from upstream.
    async fn retrieve_certificate(&self, domain: &str) -> Result<CertificateBundle, ProviderError>;

    /// Check that the provider holds everything it needs to talk to upstream.
    fn validate_configuration(&self) -> Result<(), ProviderError>;
}

/// Configuration-driven factory deciding whether and how to build a provider.
#[async_trait::async_trait]
pub trait ProviderBootstrap: Send + Sync {
    /// Name of the provider this bootstrap creates.
    fn provider_name(&self) -> &'static str;

    /// Attach this provider's flags to the root command.
    fn register_flags(&self, cmd: clap::Command) -> clap::Command;

    /// Read back flag values after parsing. Unset flags fall back to env.
    fn load_flags(&mut self, matches: &clap::ArgMatches);

    /// Whether all required configuration is present. No side effects.
    fn is_configured(&self) -> bool;

    /// Build and validate the provider, performing upstream discovery if needed.
    async fn create_provider(&self) -> Result<Arc<dyn CertificateProvider>, ProviderError>;
}

/// Split a comma-separated domain list, trimming whitespace and dropping empties.
pub fn parse_domains(input: &str) -> Vec<String> {
    input.split(',').map(str::trim).filter(|d| !d.is_empty()).map(str::to_owned).collect()
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
