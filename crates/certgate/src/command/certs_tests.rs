// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;

use bytes::Bytes;

use super::*;
use crate::error::RegistryError;
use crate::provider::testing::StaticProvider;

fn args(domain: &str) -> RetrieveArgs {
    RetrieveArgs {
        domain: domain.into(),
        output_dir: None,
        separate_files: false,
        cert_file: None,
        key_file: None,
        bundle_file: None,
    }
}

fn bundle() -> CertificateBundle {
    CertificateBundle {
        certificate_chain: Bytes::from_static(b"-----CERT-----"),
        private_key: Bytes::from_static(b"-----KEY-----\n"),
    }
}

fn mode(path: &Path) -> u32 {
    std::fs::metadata(path).map(|m| m.permissions().mode() & 0o777).unwrap_or_else(|e| {
        panic!("stat {}: {e}", path.display())
    })
}

#[tokio::test]
async fn fetch_routes_to_owning_provider() -> anyhow::Result<()> {
    let registry = ProviderRegistry::new();
    registry.register(Arc::new(StaticProvider::new("alpha", &["a.com"])))?;
    registry.register(Arc::new(StaticProvider::new("beta", &["b.com"])))?;

    let fetched = fetch(&args("b.com"), &registry).await?;
    assert_eq!(fetched.certificate_chain, Bytes::from_static(b"CERT b.com from beta\n"));
    Ok(())
}

#[tokio::test]
async fn fetch_unknown_domain_fails() -> anyhow::Result<()> {
    let registry = ProviderRegistry::new();
    registry.register(Arc::new(StaticProvider::new("alpha", &["a.com"])))?;

    let err = match fetch(&args("other.com"), &registry).await {
        Ok(_) => panic!("expected failure"),
        Err(e) => e,
    };
    assert!(matches!(err.downcast_ref::<RegistryError>(), Some(RegistryError::UnknownDomain(_))));
    Ok(())
}

#[test]
fn stdout_bundle_is_chain_then_key() -> anyhow::Result<()> {
    let mut out = Vec::new();
    let written = emit(&args("a.com"), &bundle(), &mut out)?;
    assert!(written.is_empty());
    assert_eq!(out, b"-----CERT-----\n-----KEY-----\n");
    Ok(())
}

#[test]
fn stdout_separate_has_headers() -> anyhow::Result<()> {
    let mut out = Vec::new();
    emit(&RetrieveArgs { separate_files: true, ..args("a.com") }, &bundle(), &mut out)?;
    let text = String::from_utf8(out)?;
    assert_eq!(
        text,
        "=== Certificate Chain ===\n-----CERT-----\n\n=== Private Key ===\n-----KEY-----\n"
    );
    Ok(())
}

#[test]
fn bundle_file_defaults_and_is_private() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let out_dir = dir.path().join("nested");
    let mut out = Vec::new();

    let written = emit(&RetrieveArgs { output_dir: Some(out_dir.clone()), ..args("a.com") }, &bundle(), &mut out)?;

    let path = out_dir.join("a.com-bundle.pem");
    assert_eq!(written, [path.clone()]);
    assert_eq!(std::fs::read(&path)?, b"-----CERT-----\n-----KEY-----\n");
    assert_eq!(mode(&path), 0o600);
    assert!(String::from_utf8(out)?.contains("a.com-bundle.pem"));
    Ok(())
}

#[test]
fn separate_files_get_distinct_modes() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut out = Vec::new();
    let args = RetrieveArgs {
        output_dir: Some(dir.path().to_path_buf()),
        separate_files: true,
        ..args("a.com")
    };

    emit(&args, &bundle(), &mut out)?;

    let cert = dir.path().join("a.com.crt");
    let key = dir.path().join("a.com.key");
    assert_eq!(std::fs::read(&cert)?, b"-----CERT-----");
    assert_eq!(std::fs::read(&key)?, b"-----KEY-----\n");
    assert_eq!(mode(&cert), 0o644);
    assert_eq!(mode(&key), 0o600);
    Ok(())
}

#[test]
fn custom_names_override_defaults() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut out = Vec::new();
    let args = RetrieveArgs {
        output_dir: Some(dir.path().to_path_buf()),
        separate_files: true,
        cert_file: Some("fullchain.pem".into()),
        key_file: Some("privkey.pem".into()),
        ..args("a.com")
    };

    let written = emit(&args, &bundle(), &mut out)?;
    assert_eq!(written, [dir.path().join("fullchain.pem"), dir.path().join("privkey.pem")]);
    assert!(!dir.path().join("a.com.crt").exists());
    Ok(())
}

#[test]
fn rewrite_tightens_existing_key_mode() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let key = dir.path().join("a.com.key");
    std::fs::write(&key, b"old")?;
    std::fs::set_permissions(&key, Permissions::from_mode(0o666))?;

    let mut out = Vec::new();
    let args = RetrieveArgs {
        output_dir: Some(dir.path().to_path_buf()),
        separate_files: true,
        ..args("a.com")
    };
    emit(&args, &bundle(), &mut out)?;

    assert_eq!(std::fs::read(&key)?, b"-----KEY-----\n");
    assert_eq!(mode(&key), 0o600);
    Ok(())
}
