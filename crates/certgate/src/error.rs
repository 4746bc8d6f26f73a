// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification shared by every typed error in the crate.
///
/// Startup code aborts on `Configuration` and `RegistrationConflict`; request
/// code turns the rest into an HTTP response without touching shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    RegistrationConflict,
    Authentication,
    Resolution,
    Upstream,
}

/// Errors raised by a certificate provider or its upstream client.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("missing required {provider} fields: {}", .fields.join(", "))]
    MissingCredentials { provider: String, fields: Vec<&'static str> },

    #[error("{0}")]
    NoDomains(String),

    #[error("domain {0} is not managed by this provider")]
    NotManaged(String),

    #[error("{endpoint} failed: {message}")]
    Api { endpoint: String, message: String },

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ProviderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingCredentials { .. } | Self::NoDomains(_) => ErrorCategory::Configuration,
            Self::NotManaged(_) => ErrorCategory::Resolution,
            Self::Api { .. } | Self::Status { .. } | Self::Http(_) => ErrorCategory::Upstream,
        }
    }
}

/// Errors raised by the provider registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("provider {0} is already registered")]
    DuplicateProvider(String),

    #[error("domain {domain} is already managed by provider {existing}")]
    DuplicateDomain { domain: String, existing: String },

    #[error("provider {provider} configuration invalid: {source}")]
    InvalidConfiguration {
        provider: String,
        #[source]
        source: ProviderError,
    },

    #[error("no provider found for domain: {0}")]
    UnknownDomain(String),

    #[error("provider not found: {0}")]
    UnknownProvider(String),

    #[error("failed to retrieve certificate for {domain}: {source}")]
    Upstream {
        domain: String,
        #[source]
        source: ProviderError,
    },
}

impl RegistryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DuplicateProvider(_) | Self::DuplicateDomain { .. } => {
                ErrorCategory::RegistrationConflict
            }
            Self::InvalidConfiguration { .. } => ErrorCategory::Configuration,
            Self::UnknownDomain(_) | Self::UnknownProvider(_) => ErrorCategory::Resolution,
            Self::Upstream { source, .. } => match source.category() {
                ErrorCategory::Resolution => ErrorCategory::Resolution,
                _ => ErrorCategory::Upstream,
            },
        }
    }
}

/// Errors raised while activating provider bootstraps at startup.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to create provider {provider}: {source}")]
    Create {
        provider: String,
        #[source]
        source: ProviderError,
    },

    #[error("failed to register provider {provider}: {source}")]
    Register {
        provider: String,
        #[source]
        source: RegistryError,
    },

    #[error("no certificate providers configured")]
    NoProvidersConfigured,
}

impl BootstrapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Create { .. } | Self::NoProvidersConfigured => ErrorCategory::Configuration,
            Self::Register { source, .. } => source.category(),
        }
    }
}

/// Token issuance and verification errors.
///
/// Messages never include the token or the signing key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("signing key must not be empty")]
    EmptySigningKey,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature mismatch")]
    SignatureMismatch,

    #[error("token is expired")]
    Expired,

    #[error("token is not yet valid")]
    NotYetValid,

    #[error("{0} is required in token")]
    MissingClaim(String),

    #[error("failed to sign token: {0}")]
    Encode(String),

    #[error("failed to generate random secret")]
    KeyGeneration,
}

impl AuthError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptySigningKey | Self::Encode(_) | Self::KeyGeneration => {
                ErrorCategory::Configuration
            }
            _ => ErrorCategory::Authentication,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => AuthError::SignatureMismatch,
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::ImmatureSignature => AuthError::NotYetValid,
            ErrorKind::MissingRequiredClaim(claim) => AuthError::MissingClaim(claim.clone()),
            ErrorKind::InvalidToken => AuthError::Malformed("invalid token structure".into()),
            ErrorKind::InvalidAlgorithm => AuthError::Malformed("unsupported algorithm".into()),
            _ => AuthError::Malformed(err.to_string()),
        }
    }
}

/// Error codes for the HTTP API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    BadRequest,
    DomainNotFound,
    UpstreamError,
    Internal,
}

impl ErrorCode {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::BadRequest => 400,
            Self::DomainNotFound => 404,
            Self::UpstreamError => 502,
            Self::Internal => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::BadRequest => "BAD_REQUEST",
            Self::DomainNotFound => "DOMAIN_NOT_FOUND",
            Self::UpstreamError => "UPSTREAM_ERROR",
            Self::Internal => "INTERNAL",
        }
    }

    pub fn to_error_body(&self, message: impl Into<String>) -> ErrorBody {
        ErrorBody { code: self.as_str().to_owned(), message: message.into() }
    }

    pub fn to_http_response(
        &self,
        message: impl Into<String>,
    ) -> (StatusCode, Json<ErrorResponse>) {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse { error: self.to_error_body(message) };
        (status, Json(body))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&RegistryError> for ErrorCode {
    fn from(err: &RegistryError) -> Self {
        match err.category() {
            ErrorCategory::Resolution => Self::DomainNotFound,
            ErrorCategory::Upstream => Self::UpstreamError,
            _ => Self::Internal,
        }
    }
}

impl From<&AuthError> for ErrorCode {
    fn from(err: &AuthError) -> Self {
        match err.category() {
            ErrorCategory::Authentication => Self::Unauthorized,
            _ => Self::Internal,
        }
    }
}

/// Top-level error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error body with machine-readable code and human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
