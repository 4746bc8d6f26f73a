// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::{AuthError, ErrorCode};
use crate::state::AppState;
use crate::token::{self, AuthClaims, DomainScope};

pub const SESSION_HEADER: &str = "x-session-id";

/// Authenticated identity attached to request extensions by [`auth_layer`].
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
    pub scope: DomainScope,
    pub session_id: Option<String>,
}

/// Why a request could not be authenticated.
#[derive(Debug)]
pub enum Rejection {
    Missing,
    UnknownSession,
    Token(AuthError),
}

impl Rejection {
    fn code(&self) -> ErrorCode {
        match self {
            Self::Token(e) => ErrorCode::from(e),
            _ => ErrorCode::Unauthorized,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Missing => "missing session id or bearer token".to_owned(),
            Self::UnknownSession => "invalid or expired session".to_owned(),
            Self::Token(e) => e.to_string(),
        }
    }

    pub fn into_response(self) -> Response {
        self.code().to_http_response(self.message()).into_response()
    }
}

pub fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Verify the bearer token from `headers` with the server signing key.
pub fn verify_bearer(state: &AppState, headers: &HeaderMap) -> Result<AuthClaims, Rejection> {
    let token = bearer_token(headers).ok_or(Rejection::Missing)?;
    token::verify(token, state.signing_key()).map_err(|e| {
        tracing::debug!(err = %e, "bearer token rejected");
        Rejection::Token(e)
    })
}

/// Resolve the caller from `X-Session-Id`, falling back to a bearer token.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Caller, Rejection> {
    if let Some(id) = session_id(headers) {
        let session = state.sessions.get(id).await.ok_or(Rejection::UnknownSession)?;
        return Ok(Caller {
            user_id: session.user_id.clone(),
            scope: session.scope(),
            session_id: Some(session.session_id),
        });
    }

    let claims = verify_bearer(state, headers)?;
    Ok(Caller { scope: claims.scope(), user_id: claims.user_id, session_id: None })
}

/// Axum middleware that authenticates every request and stores the [`Caller`].
///
/// Exempt: health and the session endpoints, which authenticate themselves.
pub async fn auth_layer(
    State(state): State<Arc<AppState>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if path == "/api/v1/health" || path.starts_with("/api/v1/sessions") {
        return next.run(req).await;
    }

    match authenticate(&state, req.headers()).await {
        Ok(caller) => {
            req.extensions_mut().insert(caller);
            next.run(req).await
        }
        Err(rejection) => rejection.into_response(),
    }
}
