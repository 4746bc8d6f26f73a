// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fs::{OpenOptions, Permissions};
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use crate::config::RetrieveArgs;
use crate::provider::CertificateBundle;
use crate::registry::ProviderRegistry;

const CERT_MODE: u32 = 0o644;
const KEY_MODE: u32 = 0o600;

/// Fetch the bundle for `args.domain` from whichever provider owns it.
pub async fn fetch(args: &RetrieveArgs, registry: &ProviderRegistry) -> anyhow::Result<CertificateBundle> {
    let domain = args.domain.trim();
    anyhow::ensure!(!domain.is_empty(), "domain is required");

    let bundle = registry.retrieve_certificate(domain).await?;
    info!(domain, "certificate retrieved");
    Ok(bundle)
}

/// Print `bundle` to `out`, or write it under `--output-dir` when set.
///
/// Returns the files written, if any.
pub fn emit(args: &RetrieveArgs, bundle: &CertificateBundle, out: &mut impl Write) -> anyhow::Result<Vec<PathBuf>> {
    let Some(dir) = args.output_dir.as_deref() else {
        print_bundle(args, bundle, out)?;
        return Ok(Vec::new());
    };

    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let domain = args.domain.trim();

    let written = if args.separate_files {
        let cert_path = dir.join(args.cert_file.clone().unwrap_or_else(|| format!("{domain}.crt")));
        let key_path = dir.join(args.key_file.clone().unwrap_or_else(|| format!("{domain}.key")));
        write_file(&cert_path, &bundle.certificate_chain, CERT_MODE)?;
        writeln!(out, "Certificate chain saved to: {}", cert_path.display())?;
        write_file(&key_path, &bundle.private_key, KEY_MODE)?;
        writeln!(out, "Private key saved to: {}", key_path.display())?;
        vec![cert_path, key_path]
    } else {
        let bundle_path =
            dir.join(args.bundle_file.clone().unwrap_or_else(|| format!("{domain}-bundle.pem")));
        write_file(&bundle_path, &combined(bundle), KEY_MODE)?;
        writeln!(out, "Certificate bundle saved to: {}", bundle_path.display())?;
        vec![bundle_path]
    };
    Ok(written)
}

fn print_bundle(args: &RetrieveArgs, bundle: &CertificateBundle, out: &mut impl Write) -> std::io::Result<()> {
    if args.separate_files {
        writeln!(out, "=== Certificate Chain ===")?;
        out.write_all(&bundle.certificate_chain)?;
        end_line(&bundle.certificate_chain, out)?;
        writeln!(out)?;
        writeln!(out, "=== Private Key ===")?;
        out.write_all(&bundle.private_key)?;
        end_line(&bundle.private_key, out)?;
    } else {
        out.write_all(&combined(bundle))?;
    }
    out.flush()
}

/// Certificate chain followed by the private key, newline separated.
fn combined(bundle: &CertificateBundle) -> Vec<u8> {
    let mut pem = Vec::with_capacity(bundle.certificate_chain.len() + bundle.private_key.len() + 2);
    pem.extend_from_slice(&bundle.certificate_chain);
    let _ = end_line(&bundle.certificate_chain, &mut pem);
    pem.extend_from_slice(&bundle.private_key);
    let _ = end_line(&bundle.private_key, &mut pem);
    pem
}

fn end_line(written: &[u8], out: &mut impl Write) -> std::io::Result<()> {
    if written.last().is_some_and(|b| *b != b'\n') {
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Write `contents` to `path` with `mode`, tightening an existing file too.
fn write_file(path: &Path, contents: &[u8], mode: u32) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.set_permissions(Permissions::from_mode(mode))
        .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    file.write_all(contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "certs_tests.rs"]
mod tests;
