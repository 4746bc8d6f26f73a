// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the Porkbun JSON API.
//!
//! Every endpoint is a POST carrying `apikey` + `secretapikey` in the body.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

pub const DEFAULT_API_URL: &str = "https://api.porkbun.com/api/json/v3";

const SUCCESS: &str = "SUCCESS";

/// A domain entry from `/domain/listAll`.
#[derive(Debug, Clone, Deserialize)]
pub struct PorkbunDomain {
    pub domain: String,
    pub status: String,
    #[serde(default, rename = "createDate")]
    pub create_date: String,
    #[serde(default, rename = "expireDate")]
    pub expire_date: String,
}

#[derive(Debug, Deserialize)]
struct ListDomainsResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    domains: Vec<PorkbunDomain>,
}

#[derive(Debug, Deserialize)]
pub struct SslResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "certificatechain")]
    pub certificate_chain: String,
    #[serde(default, rename = "privatekey")]
    pub private_key: String,
}

#[derive(Debug, Deserialize)]
pub struct PingResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "yourIp")]
    pub your_ip: String,
}

#[derive(Serialize)]
struct AuthBody<'a> {
    secretapikey: &'a str,
    apikey: &'a str,
}

/// Authenticated Porkbun API client.
pub struct PorkbunClient {
    base_url: String,
    api_key: String,
    secret_key: String,
    client: Client,
}

impl PorkbunClient {
    pub fn new(base_url: &str, api_key: &str, secret_key: &str) -> Self {
        crate::ensure_crypto_provider();
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            secret_key: secret_key.to_owned(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let body = AuthBody { secretapikey: &self.secret_key, apikey: &self.api_key };
        let resp = self.client.post(self.url(path)).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status: status.as_u16(), body });
        }
        Ok(resp.json().await?)
    }

    /// Check credentials and connectivity.
    pub async fn ping(&self) -> Result<PingResponse, ProviderError> {
        let resp: PingResponse = self.post("/ping").await?;
        check_status("ping", &resp.status, resp.message.as_deref())?;
        Ok(resp)
    }

    /// List every domain in the account.
    pub async fn list_domains(&self) -> Result<Vec<PorkbunDomain>, ProviderError> {
        let resp: ListDomainsResponse = self.post("/domain/listAll").await?;
        check_status("list domains", &resp.status, resp.message.as_deref())?;
        Ok(resp.domains)
    }

    /// Retrieve the SSL bundle Porkbun generated for `domain`.
    pub async fn retrieve_ssl(&self, domain: &str) -> Result<SslResponse, ProviderError> {
        let resp: SslResponse = self.post(&format!("/ssl/retrieve/{domain}")).await?;
        check_status("SSL retrieval", &resp.status, resp.message.as_deref())?;
        Ok(resp)
    }
}

fn check_status(endpoint: &str, status: &str, message: Option<&str>) -> Result<(), ProviderError> {
    if status == SUCCESS {
        return Ok(());
    }
    let message = match message {
        Some(m) if !m.is_empty() => format!("{status}: {m}"),
        _ => status.to_owned(),
    };
    Err(ProviderError::Api { endpoint: endpoint.to_owned(), message })
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
