// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that run the real `certgate` binary.

use std::time::Duration;

use certgate::provider::testing::{spawn_fake_porkbun, FakeDomain, FAKE_PORKBUN_KEY};
use certgate_specs::{run, run_ok, CertgateServer};

const TIMEOUT: Duration = Duration::from_secs(10);
const KEY: &str = "smoke-secret";

fn token_line(out: &str) -> anyhow::Result<String> {
    let mut lines = out.lines().skip_while(|l| *l != "Token:");
    lines.next();
    lines.next().map(str::to_owned).ok_or_else(|| anyhow::anyhow!("no token in:\n{out}"))
}

fn fake_domains() -> Vec<FakeDomain> {
    vec![
        FakeDomain {
            domain: "example.com",
            status: "ACTIVE",
            create_date: "2020-01-02 03:04:05",
            expire_date: "2030-01-02 03:04:05",
        },
        FakeDomain {
            domain: "lapsed.net",
            status: "EXPIRED",
            create_date: "2019-01-01 00:00:00",
            expire_date: "2021-01-01 00:00:00",
        },
    ]
}

// -- jwt ----------------------------------------------------------------------

#[test]
fn create_secret_key_prints_usage() -> anyhow::Result<()> {
    let out = run_ok(&["jwt", "create-secret-key"])?;
    assert!(out.contains("export JWT_SECRET_KEY=\""));
    assert!(out.contains("--jwt-secret-key \""));
    Ok(())
}

#[test]
fn token_roundtrip_through_cli() -> anyhow::Result<()> {
    let created = run_ok(&[
        "jwt",
        "create-token",
        "--user-id",
        "smoke",
        "--description",
        "smoke test",
        "--allowed-domains",
        "example.com,*.example.com",
        "--expires-at",
        "1d",
        "--jwt-secret-key",
        KEY,
    ])?;
    let token = token_line(&created)?;

    let verified = run_ok(&["jwt", "verify-token", &token, "--jwt-secret-key", KEY])?;
    assert!(verified.contains("Token verification successful"));
    assert!(verified.contains("  User ID: smoke"));
    assert!(verified.contains("  Allowed Domains: example.com, *.example.com"));

    let rejected = run(&["jwt", "verify-token", &token, "--jwt-secret-key", "wrong"])?;
    assert!(!rejected.status.success());
    Ok(())
}

#[test]
fn create_token_without_key_fails() -> anyhow::Result<()> {
    let out = run(&[
        "jwt",
        "create-token",
        "--user-id",
        "smoke",
        "--description",
        "d",
        "--allowed-domains",
        "example.com",
    ])?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("jwt secret key is required"));
    Ok(())
}

// -- domain / certs -----------------------------------------------------------

#[test]
fn domain_list_with_configured_domains() -> anyhow::Result<()> {
    let out = run_ok(&[
        "domain",
        "list",
        "--format",
        "json",
        "--detail",
        "--porkbun-api-key",
        "k",
        "--porkbun-secret-key",
        "s",
        "--porkbun-domains",
        "b.example.com, a.example.com",
    ])?;
    let value: serde_json::Value = serde_json::from_str(&out)?;
    assert_eq!(value["total"], 2);
    assert_eq!(value["domains"][0]["name"], "a.example.com");
    assert_eq!(value["domains"][0]["status"], "CONFIGURED");
    assert_eq!(value["domains"][1]["provider"], "porkbun");
    Ok(())
}

#[test]
fn domain_list_simple_prints_names() -> anyhow::Result<()> {
    let out = run_ok(&[
        "domain",
        "list",
        "--format",
        "simple",
        "--porkbun-api-key",
        "k",
        "--porkbun-secret-key",
        "s",
        "--porkbun-domains",
        "b.example.com,a.example.com",
    ])?;
    assert_eq!(out, "a.example.com\nb.example.com\n");
    Ok(())
}

#[test]
fn version_prints_package_version() -> anyhow::Result<()> {
    let out = run_ok(&["version"])?;
    assert!(out.starts_with("certgate v"), "unexpected: {out}");
    Ok(())
}

#[test]
fn domain_list_without_providers_fails() -> anyhow::Result<()> {
    let out = run(&["domain", "list"])?;
    assert!(!out.status.success());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn certs_retrieve_writes_files() -> anyhow::Result<()> {
    let api_url = spawn_fake_porkbun(fake_domains()).await?;
    let dir = tempfile::tempdir()?;
    let out_dir = dir.path().to_string_lossy().into_owned();

    let out = tokio::task::spawn_blocking(move || {
        run_ok(&[
            "certs",
            "retrieve",
            "example.com",
            "--output-dir",
            &out_dir,
            "--separate-files",
            "--porkbun-api-key",
            FAKE_PORKBUN_KEY,
            "--porkbun-secret-key",
            "sk",
            "--porkbun-api-url",
            &api_url,
        ])
    })
    .await??;

    assert!(out.contains("example.com.crt"));
    let cert = std::fs::read_to_string(dir.path().join("example.com.crt"))?;
    let key = std::fs::read_to_string(dir.path().join("example.com.key"))?;
    assert!(cert.contains("BEGIN CERTIFICATE"));
    assert!(key.contains("BEGIN PRIVATE KEY"));
    Ok(())
}

// -- serve --------------------------------------------------------------------

#[test]
fn serve_without_key_fails_fast() -> anyhow::Result<()> {
    let out = run(&[
        "serve",
        "--porkbun-api-key",
        "k",
        "--porkbun-secret-key",
        "s",
        "--porkbun-domains",
        "example.com",
    ])?;
    assert!(!out.status.success());
    Ok(())
}

#[tokio::test]
async fn serve_health_and_session() -> anyhow::Result<()> {
    let server = CertgateServer::start(
        KEY,
        &["--porkbun-api-key", "k", "--porkbun-secret-key", "s", "--porkbun-domains", "example.com"],
    )?;
    server.wait_healthy(TIMEOUT).await?;

    let client = reqwest::Client::new();
    let health: serde_json::Value =
        client.get(format!("{}/api/v1/health", server.base_url())).send().await?.json().await?;
    assert_eq!(health["status"], "running");
    assert_eq!(health["providers"], serde_json::json!(["porkbun"]));
    assert_eq!(health["domains"], 1);

    let created = run_ok(&[
        "jwt",
        "create-token",
        "--user-id",
        "smoke",
        "--description",
        "serve",
        "--allowed-domains",
        "example.com",
        "--jwt-secret-key",
        KEY,
    ])?;
    let token = token_line(&created)?;

    let resp = client
        .post(format!("{}/api/v1/sessions", server.base_url()))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 201);
    let session: serde_json::Value = resp.json().await?;
    let session_id = session["session_id"].as_str().unwrap_or_default().to_owned();
    assert!(!session_id.is_empty());

    let domains: serde_json::Value = client
        .get(format!("{}/api/v1/domains", server.base_url()))
        .header("X-Session-Id", &session_id)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(domains[0]["name"], "example.com");

    let resp = client.get(format!("{}/api/v1/domains", server.base_url())).send().await?;
    assert_eq!(resp.status().as_u16(), 401);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn serve_proxies_certificates() -> anyhow::Result<()> {
    let api_url = spawn_fake_porkbun(fake_domains()).await?;
    let server = CertgateServer::start(
        KEY,
        &[
            "--porkbun-api-key",
            FAKE_PORKBUN_KEY,
            "--porkbun-secret-key",
            "sk",
            "--porkbun-api-url",
            &api_url,
        ],
    )?;
    server.wait_healthy(TIMEOUT).await?;

    let created = run_ok(&[
        "jwt",
        "create-token",
        "--user-id",
        "smoke",
        "--description",
        "serve",
        "--allowed-domains",
        "*.com,example.com,lapsed.net",
        "--jwt-secret-key",
        KEY,
    ])?;
    let token = token_line(&created)?;
    let client = reqwest::Client::new();

    let cert: serde_json::Value = client
        .get(format!("{}/api/v1/certificates/example.com", server.base_url()))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(cert["provider"], "porkbun");
    assert!(cert["certificate_chain"].as_str().unwrap_or_default().contains("example.com"));

    // Expired registrations are not discovered.
    let resp = client
        .get(format!("{}/api/v1/certificates/lapsed.net", server.base_url()))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 404);
    Ok(())
}

#[tokio::test]
async fn serve_stops_on_sigterm() -> anyhow::Result<()> {
    let mut server = CertgateServer::start(
        KEY,
        &["--porkbun-api-key", "k", "--porkbun-secret-key", "s", "--porkbun-domains", "example.com"],
    )?;
    server.wait_healthy(TIMEOUT).await?;
    assert!(server.port() > 0);

    server.terminate()?;
    let status = server.wait_exit(TIMEOUT).await?;
    assert!(status.success(), "unexpected exit: {status}");
    Ok(())
}
