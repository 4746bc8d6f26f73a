// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds a [`PorkbunProvider`] from flags or environment.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Arg, ArgMatches};

use super::client::{PorkbunClient, DEFAULT_API_URL};
use super::{PorkbunProvider, PROVIDER_NAME};
use crate::error::ProviderError;
use crate::provider::{parse_domains, CertificateProvider, DomainInfo, DomainStatus, ProviderBootstrap};

pub const ENV_API_KEY: &str = "PORKBUN_API_KEY";
pub const ENV_SECRET_KEY: &str = "PORKBUN_SECRET_KEY";
pub const ENV_DOMAINS: &str = "PORKBUN_DOMAINS";
pub const ENV_API_URL: &str = "PORKBUN_API_URL";

const FLAG_API_KEY: &str = "porkbun-api-key";
const FLAG_SECRET_KEY: &str = "porkbun-secret-key";
const FLAG_DOMAINS: &str = "porkbun-domains";
const FLAG_API_URL: &str = "porkbun-api-url";

/// Porkbun date format: `2018-08-20 17:52:51`.
const PORKBUN_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Flag values take precedence; anything left unset is read from env.
#[derive(Debug, Default)]
pub struct PorkbunBootstrap {
    api_key: Option<String>,
    secret_key: Option<String>,
    domains: Option<String>,
    api_url: Option<String>,
}

impl PorkbunBootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset values, bypassing flag parsing.
    pub fn with_values(
        api_key: Option<String>,
        secret_key: Option<String>,
        domains: Option<String>,
        api_url: Option<String>,
    ) -> Self {
        Self { api_key, secret_key, domains, api_url }
    }

    fn api_key(&self) -> String {
        resolve(&self.api_key, ENV_API_KEY)
    }

    fn secret_key(&self) -> String {
        resolve(&self.secret_key, ENV_SECRET_KEY)
    }

    fn domains(&self) -> String {
        resolve(&self.domains, ENV_DOMAINS)
    }

    fn api_url(&self) -> String {
        let url = resolve(&self.api_url, ENV_API_URL);
        if url.is_empty() {
            DEFAULT_API_URL.to_owned()
        } else {
            url
        }
    }

    /// Enumerate the account's ACTIVE domains.
    async fn discover(
        &self,
        api_url: &str,
        api_key: &str,
        secret_key: &str,
    ) -> Result<(Vec<String>, Vec<DomainInfo>), ProviderError> {
        let client = PorkbunClient::new(api_url, api_key, secret_key);

        client.ping().await.map_err(|e| match e {
            ProviderError::Api { message, .. } => ProviderError::Api {
                endpoint: "connect to Porkbun API".to_owned(),
                message,
            },
            other => other,
        })?;

        let listed = client.list_domains().await?;
        if listed.is_empty() {
            return Err(ProviderError::NoDomains("no domains found in Porkbun account".to_owned()));
        }

        let mut domains = Vec::new();
        let mut infos = Vec::new();
        for d in listed {
            let status: DomainStatus = d.status.parse().unwrap_or(DomainStatus::Unknown);
            if status != DomainStatus::Active {
                tracing::debug!(domain = %d.domain, status = %d.status, "skipping inactive domain");
                continue;
            }
            infos.push(DomainInfo {
                name: d.domain.clone(),
                status,
                provider: PROVIDER_NAME.to_owned(),
                created_at: parse_date(&d.create_date),
                expires_at: parse_date(&d.expire_date),
                // listAll does not report auto-renew.
                auto_renew: false,
            });
            domains.push(d.domain);
        }

        if domains.is_empty() {
            return Err(ProviderError::NoDomains(
                "no active domains found in Porkbun account".to_owned(),
            ));
        }
        Ok((domains, infos))
    }
}

#[async_trait::async_trait]
impl ProviderBootstrap for PorkbunBootstrap {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn register_flags(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            Arg::new(FLAG_API_KEY)
                .long(FLAG_API_KEY)
                .global(true)
                .value_name("KEY")
                .help("Porkbun API key (overrides PORKBUN_API_KEY env var)"),
        )
        .arg(
            Arg::new(FLAG_SECRET_KEY)
                .long(FLAG_SECRET_KEY)
                .global(true)
                .value_name("KEY")
                .help("Porkbun secret key (overrides PORKBUN_SECRET_KEY env var)"),
        )
        .arg(
            Arg::new(FLAG_DOMAINS)
                .long(FLAG_DOMAINS)
                .global(true)
                .value_name("DOMAINS")
                .help("Comma-separated list of domains (default: all active domains in the account)"),
        )
        .arg(
            Arg::new(FLAG_API_URL)
                .long(FLAG_API_URL)
                .global(true)
                .value_name("URL")
                .hide(true)
                .help("Porkbun API base URL (overrides PORKBUN_API_URL env var)"),
        )
    }

    fn load_flags(&mut self, matches: &ArgMatches) {
        let get = |id: &str| matches.try_get_one::<String>(id).ok().flatten().cloned();
        self.api_key = get(FLAG_API_KEY);
        self.secret_key = get(FLAG_SECRET_KEY);
        self.domains = get(FLAG_DOMAINS);
        self.api_url = get(FLAG_API_URL);
    }

    fn is_configured(&self) -> bool {
        // Domains are optional; they are discovered when not listed.
        !self.api_key().is_empty() && !self.secret_key().is_empty()
    }

    async fn create_provider(&self) -> Result<Arc<dyn CertificateProvider>, ProviderError> {
        let api_key = self.api_key();
        let secret_key = self.secret_key();
        let domains_str = self.domains();
        let api_url = self.api_url();

        let mut missing = Vec::new();
        if api_key.is_empty() {
            missing.push("api-key");
        }
        if secret_key.is_empty() {
            missing.push("secret-key");
        }
        if !missing.is_empty() {
            return Err(ProviderError::MissingCredentials {
                provider: "Porkbun".to_owned(),
                fields: missing,
            });
        }

        let (domains, infos) = if domains_str.is_empty() {
            let discovered = self.discover(&api_url, &api_key, &secret_key).await?;
            tracing::info!(count = discovered.0.len(), "discovered porkbun domains");
            discovered
        } else {
            let domains = parse_domains(&domains_str);
            if domains.is_empty() {
                return Err(ProviderError::NoDomains(
                    "no valid domains specified for Porkbun".to_owned(),
                ));
            }
            let infos = domains
                .iter()
                .map(|d| DomainInfo::basic(d.as_str(), PROVIDER_NAME, DomainStatus::Configured))
                .collect();
            (domains, infos)
        };

        let provider =
            PorkbunProvider::new(&api_url, &api_key, &secret_key, domains).with_domain_infos(infos);
        provider.validate_configuration()?;
        Ok(Arc::new(provider))
    }
}

fn resolve(flag: &Option<String>, env: &str) -> String {
    match flag {
        Some(v) if !v.is_empty() => v.clone(),
        _ => std::env::var(env).unwrap_or_default(),
    }
}

/// Parse a Porkbun timestamp as UTC. Empty or unparsable input yields `None`.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    if input.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(input, PORKBUN_DATE_FORMAT).ok().map(|t| t.and_utc())
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
