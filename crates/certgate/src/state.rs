// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use crate::error::AuthError;
use crate::registry::ProviderRegistry;
use crate::session::SessionTracker;

/// Shared state handed to every request handler.
pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
    pub sessions: Arc<SessionTracker>,
    signing_key: String,
}

impl AppState {
    /// Build server state. A blank signing key is refused so that request
    /// authentication can never fall into unverified parsing.
    pub fn new(
        registry: Arc<ProviderRegistry>,
        sessions: Arc<SessionTracker>,
        signing_key: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let signing_key = signing_key.into();
        if signing_key.trim().is_empty() {
            return Err(AuthError::EmptySigningKey);
        }
        Ok(Self { registry, sessions, signing_key })
    }

    pub fn signing_key(&self) -> &str {
        &self.signing_key
    }
}
