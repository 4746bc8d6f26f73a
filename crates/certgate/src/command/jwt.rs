// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use anyhow::Context;
use chrono::Utc;
use tracing::warn;

use crate::config::{CreateTokenArgs, JwtCommand, VerifyTokenArgs};
use crate::provider::parse_domains;
use crate::timefmt::{format_date_time, format_duration, parse_expiry, DEFAULT_TOKEN_LIFETIME};
use crate::token::{self, AuthClaims};

pub fn run(cmd: JwtCommand, out: &mut impl Write) -> anyhow::Result<()> {
    match cmd {
        JwtCommand::CreateToken(args) => create_token(&args, out),
        JwtCommand::VerifyToken(args) => verify_token(&args, out),
        JwtCommand::CreateSecretKey => create_secret_key(out),
    }
}

/// Sign a token for the given user and domain patterns and print it.
pub fn create_token(args: &CreateTokenArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let signing_key = non_blank(args.jwt_secret_key.as_deref()).ok_or_else(|| {
        anyhow::anyhow!("jwt secret key is required; use --jwt-secret-key or set JWT_SECRET_KEY")
    })?;
    anyhow::ensure!(!args.user_id.trim().is_empty(), "user-id is required");
    anyhow::ensure!(!args.description.trim().is_empty(), "description is required");

    let allowed_domains = parse_domains(&args.allowed_domains);
    anyhow::ensure!(!allowed_domains.is_empty(), "allowed-domains is required");

    let now = Utc::now();
    let expires_at = match args.expires_at.as_deref() {
        Some(input) => parse_expiry(input, now)?,
        None => now + chrono::Duration::from_std(DEFAULT_TOKEN_LIFETIME)?,
    };
    anyhow::ensure!(expires_at > now, "expires-at must be in the future");

    let token = token::issue(&args.user_id, &args.description, expires_at, &allowed_domains, signing_key)
        .context("failed to create token")?;
    let claims = token::verify(&token, signing_key).context("issued token failed verification")?;

    writeln!(out, "Token created successfully:")?;
    writeln!(out)?;
    writeln!(out, "Token:")?;
    writeln!(out, "{token}")?;
    writeln!(out)?;
    write_claims(&claims, out)?;
    Ok(())
}

/// Verify a token and print its claims.
///
/// Without a signing key the claims are only decoded. That output is not
/// proof the token is genuine.
pub fn verify_token(args: &VerifyTokenArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let signing_key = non_blank(args.jwt_secret_key.as_deref()).unwrap_or_default();
    if signing_key.is_empty() {
        warn!("no signing key given; the signature is not checked");
    }

    let claims = token::verify(args.token.trim(), signing_key).context("token verification failed")?;

    if signing_key.is_empty() {
        writeln!(out, "Token decoded (signature NOT verified)")?;
    } else {
        writeln!(out, "Token verification successful")?;
    }
    writeln!(out)?;
    write_claims(&claims, out)?;

    // verify() already rejected expired tokens.
    let left = (claims.expires_at() - Utc::now()).to_std().unwrap_or_default();
    writeln!(out, "  Status: valid (expires in {})", format_duration(left))?;
    Ok(())
}

/// Print a fresh random signing secret with usage hints.
pub fn create_secret_key(out: &mut impl Write) -> anyhow::Result<()> {
    let secret = token::generate_secret_key()?;
    writeln!(out, "Generated secret key (base64 encoded):")?;
    writeln!(out, "    {secret}")?;
    writeln!(out)?;
    writeln!(out, "Usage:")?;
    writeln!(out, "    Environment variable:")?;
    writeln!(out, "        export JWT_SECRET_KEY=\"{secret}\"")?;
    writeln!(out, "    Command line option:")?;
    writeln!(out, "        --jwt-secret-key \"{secret}\"")?;
    Ok(())
}

fn write_claims(claims: &AuthClaims, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "Claims:")?;
    writeln!(out, "  User ID: {}", claims.user_id)?;
    writeln!(out, "  Description: {}", claims.description)?;
    writeln!(out, "  Allowed Domains: {}", claims.allowed_domains.join(", "))?;
    writeln!(out, "  Expires At: {}", format_date_time(claims.expires_at()))?;
    writeln!(out, "  Issued At: {}", format_date_time(claims.issued_at()))?;
    writeln!(out, "  Not Before: {}", format_date_time(claims.not_before()))?;
    if !claims.iss.is_empty() {
        writeln!(out, "  Issuer: {}", claims.iss)?;
    }
    if !claims.sub.is_empty() {
        writeln!(out, "  Subject: {}", claims.sub)?;
    }
    Ok(())
}

fn non_blank(key: Option<&str>) -> Option<&str> {
    key.filter(|k| !k.trim().is_empty())
}

#[cfg(test)]
#[path = "jwt_tests.rs"]
mod tests;
