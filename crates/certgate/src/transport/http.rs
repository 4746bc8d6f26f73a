// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the certificate API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, RegistryError};
use crate::provider::DomainInfo;
use crate::state::AppState;
use crate::transport::auth::{self, Caller, Rejection};

// -- Request/Response types ---------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub providers: Vec<String>,
    pub domains: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub user_id: String,
    pub description: String,
    pub allowed_domains: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CertificateResponse {
    pub domain: String,
    pub provider: String,
    pub certificate_chain: String,
    pub private_key: String,
}

// -- Handlers -----------------------------------------------------------------

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "running".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        providers: s.registry.list_providers().into_iter().collect(),
        domains: s.registry.domain_count(),
    })
}

/// `POST /api/v1/sessions`: exchange a bearer token for a session.
pub async fn create_session(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let claims = match auth::verify_bearer(&s, &headers) {
        Ok(c) => c,
        Err(rejection) => return rejection.into_response(),
    };

    let id = s
        .sessions
        .create(&claims.user_id, &claims.description, claims.expires_at(), claims.allowed_domains)
        .await;
    let Some(session) = s.sessions.get(&id).await else {
        return Rejection::UnknownSession.into_response();
    };

    tracing::info!(user_id = %session.user_id, "session created");
    let body = SessionResponse {
        session_id: session.session_id,
        user_id: session.user_id,
        description: session.description,
        allowed_domains: session.allowed_domains,
        expires_at: session.expires_at,
    };
    (StatusCode::CREATED, Json(body)).into_response()
}

/// `DELETE /api/v1/sessions/current`: idempotent logout.
pub async fn delete_session(
    State(s): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let Some(id) = auth::session_id(&headers) else {
        return ErrorCode::BadRequest.to_http_response("missing X-Session-Id header").into_response();
    };
    s.sessions.delete(id).await;
    StatusCode::NO_CONTENT.into_response()
}

/// `GET /api/v1/domains`: managed domains the caller may fetch.
pub async fn list_domains(
    State(s): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> impl IntoResponse {
    let visible: Vec<DomainInfo> = s
        .registry
        .list_all_domain_info()
        .into_iter()
        .filter(|info| caller.scope.allows(&info.name))
        .collect();
    Json(visible)
}

/// `GET /api/v1/certificates/{domain}`
pub async fn get_certificate(
    State(s): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(domain): Path<String>,
) -> impl IntoResponse {
    if !caller.scope.allows(&domain) {
        tracing::info!(user_id = %caller.user_id, domain = %domain, "certificate access denied");
        return ErrorCode::Forbidden
            .to_http_response(format!("not authorized for domain: {domain}"))
            .into_response();
    }

    let provider = match s.registry.resolve_domain(&domain) {
        Ok(p) => p.name().to_owned(),
        Err(e) => return registry_error(&e).into_response(),
    };

    match s.registry.retrieve_certificate(&domain).await {
        Ok(bundle) => {
            tracing::info!(user_id = %caller.user_id, domain = %domain, provider = %provider, "certificate retrieved");
            Json(CertificateResponse {
                domain,
                provider,
                certificate_chain: String::from_utf8_lossy(&bundle.certificate_chain).into_owned(),
                private_key: String::from_utf8_lossy(&bundle.private_key).into_owned(),
            })
            .into_response()
        }
        Err(e) => {
            tracing::warn!(domain = %domain, err = %e, "certificate retrieval failed");
            registry_error(&e).into_response()
        }
    }
}

fn registry_error(err: &RegistryError) -> impl IntoResponse {
    ErrorCode::from(err).to_http_response(err.to_string())
}
