// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signed, time-bounded, domain-scoped bearer tokens.
//!
//! Tokens are compact JWS (HMAC-SHA2). The claims carry the caller identity
//! and the list of domain patterns it may fetch certificates for.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Value of the `iss` claim on every issued token.
pub const ISSUER: &str = "certgate";

/// Size of a generated signing secret, before encoding.
pub const SECRET_KEY_BYTES: usize = 32;

/// Claims embedded in a certgate token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub allowed_domains: Vec<String>,
    /// Expiration (seconds since epoch).
    pub exp: u64,
    #[serde(default)]
    pub iat: u64,
    #[serde(default)]
    pub nbf: u64,
    #[serde(default)]
    pub iss: String,
    #[serde(default)]
    pub sub: String,
}

impl AuthClaims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        from_unix(self.exp)
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        from_unix(self.iat)
    }

    pub fn not_before(&self) -> DateTime<Utc> {
        from_unix(self.nbf)
    }

    /// Domain patterns this token authorizes.
    pub fn scope(&self) -> DomainScope {
        DomainScope::new(&self.allowed_domains)
    }

    fn require_fields(&self) -> Result<(), AuthError> {
        if self.user_id.is_empty() {
            return Err(AuthError::MissingClaim("user_id".into()));
        }
        if self.description.is_empty() {
            return Err(AuthError::MissingClaim("description".into()));
        }
        Ok(())
    }
}

/// Sign a new HS256 token.
///
/// Only the signing key is required. An empty `allowed_domains` yields a
/// token that authorizes nothing.
pub fn issue(
    user_id: &str,
    description: &str,
    expires_at: DateTime<Utc>,
    allowed_domains: &[String],
    signing_key: &str,
) -> Result<String, AuthError> {
    if signing_key.is_empty() {
        return Err(AuthError::EmptySigningKey);
    }

    let now = now_secs();
    let claims = AuthClaims {
        user_id: user_id.to_owned(),
        description: description.to_owned(),
        allowed_domains: allowed_domains.to_vec(),
        exp: to_unix(expires_at),
        iat: now,
        nbf: now,
        iss: ISSUER.to_owned(),
        sub: user_id.to_owned(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(signing_key.as_bytes()))
        .map_err(|e| AuthError::Encode(e.to_string()))
}

/// Verify `token` against `signing_key` and return its claims.
///
/// An empty `signing_key` switches to [`parse_unverified`]. That mode is for
/// diagnostics only and must never back an authorization decision.
pub fn verify(token: &str, signing_key: &str) -> Result<AuthClaims, AuthError> {
    if signing_key.is_empty() {
        return parse_unverified(token);
    }

    let data = decode::<AuthClaims>(
        token,
        &DecodingKey::from_secret(signing_key.as_bytes()),
        &validation(),
    )?;
    data.claims.require_fields()?;
    Ok(data.claims)
}

/// Decode claims without checking the signature.
///
/// The header must still parse, and expiry, not-before, and required fields
/// are still enforced.
pub fn parse_unverified(token: &str) -> Result<AuthClaims, AuthError> {
    let mut validation = validation();
    validation.insecure_disable_signature_validation();

    let data = decode::<AuthClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    data.claims.require_fields()?;
    Ok(data.claims)
}

/// HMAC-only validation with no clock leeway.
fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    validation.leeway = 0;
    validation.validate_nbf = true;
    validation.validate_aud = false;
    validation
}

/// Random signing secret, base64 encoded.
pub fn generate_secret_key() -> Result<String, AuthError> {
    let mut bytes = [0u8; SECRET_KEY_BYTES];
    SystemRandom::new().fill(&mut bytes).map_err(|_| AuthError::KeyGeneration)?;
    Ok(STANDARD.encode(bytes))
}

/// Normalized set of domain patterns from a token's `allowed_domains`.
///
/// A pattern authorizes a domain when the two are equal (ignoring case and a
/// trailing dot), or when the pattern is `*.S` and the domain is exactly one
/// non-empty label followed by `.S`. `*.example.com` covers `www.example.com`
/// but neither `example.com` nor `a.b.example.com`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainScope {
    patterns: Vec<String>,
}

impl DomainScope {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| normalize(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();
        Self { patterns }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn allows(&self, domain: &str) -> bool {
        let domain = normalize(domain);
        if domain.is_empty() {
            return false;
        }
        self.patterns.iter().any(|p| pattern_matches(p, &domain))
    }
}

fn pattern_matches(pattern: &str, domain: &str) -> bool {
    if pattern == domain {
        return true;
    }
    let Some(suffix) = pattern.strip_prefix("*.") else {
        return false;
    };
    if suffix.is_empty() {
        return false;
    }
    match domain.strip_suffix(suffix).and_then(|rest| rest.strip_suffix('.')) {
        Some(label) => !label.is_empty() && !label.contains('.'),
        None => false,
    }
}

fn normalize(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

fn now_secs() -> u64 {
    to_unix(Utc::now())
}

fn to_unix(at: DateTime<Utc>) -> u64 {
    at.timestamp().max(0) as u64
}

fn from_unix(secs: u64) -> DateTime<Utc> {
    i64::try_from(secs)
        .ok()
        .and_then(|s| Utc.timestamp_opt(s, 0).single())
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
#[path = "token_tests.rs"]
mod tests;
