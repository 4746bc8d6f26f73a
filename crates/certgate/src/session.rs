// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory sessions derived from verified tokens.
//!
//! A session lives at most `ttl` and never past the expiry of the token it
//! came from. Expired entries are dropped on read, by explicit delete, or by
//! the periodic sweeper.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::token::DomainScope;

/// Upper bound on a session's lifetime.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Period of the background expiry sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Point-in-time copy of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub description: String,
    pub allowed_domains: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn scope(&self) -> DomainScope {
        DomainScope::new(&self.allowed_domains)
    }
}

struct SessionEntry {
    id: String,
    user_id: String,
    description: String,
    allowed_domains: Vec<String>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    /// Epoch millis, touched on every successful read.
    last_accessed_ms: AtomicI64,
}

impl SessionEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    fn snapshot(&self) -> Session {
        let last = Utc
            .timestamp_millis_opt(self.last_accessed_ms.load(Ordering::Relaxed))
            .single()
            .unwrap_or(self.created_at);
        Session {
            session_id: self.id.clone(),
            user_id: self.user_id.clone(),
            description: self.description.clone(),
            allowed_domains: self.allowed_domains.clone(),
            created_at: self.created_at,
            last_accessed_at: last,
            expires_at: self.expires_at,
        }
    }
}

type SessionMap = HashMap<String, Arc<SessionEntry>>;

/// Tracks live sessions keyed by an opaque random identifier.
pub struct SessionTracker {
    sessions: Arc<RwLock<SessionMap>>,
    ttl: Duration,
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())), ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store a new session and return its identifier.
    ///
    /// Effective expiry is the earlier of `expires_at` and now + TTL.
    pub async fn create(
        &self,
        user_id: &str,
        description: &str,
        expires_at: DateTime<Utc>,
        allowed_domains: Vec<String>,
    ) -> String {
        let now = Utc::now();
        let cap = chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl));
        let effective = cap.map_or(expires_at, |cap| cap.min(expires_at));

        let id = uuid::Uuid::new_v4().to_string();
        let entry = Arc::new(SessionEntry {
            id: id.clone(),
            user_id: user_id.to_owned(),
            description: description.to_owned(),
            allowed_domains,
            created_at: now,
            expires_at: effective,
            last_accessed_ms: AtomicI64::new(now.timestamp_millis()),
        });

        self.sessions.write().await.insert(id.clone(), entry);
        tracing::debug!(user_id, expires_at = %effective, "session created");
        id
    }

    /// Look up a live session and touch its last-access time.
    ///
    /// An expired entry reports `None` immediately; its removal is scheduled
    /// in the background and may not have happened when this returns.
    pub async fn get(&self, session_id: &str) -> Option<Session> {
        let entry = self.sessions.read().await.get(session_id).cloned()?;

        let now = Utc::now();
        if entry.is_expired(now) {
            let sessions = Arc::clone(&self.sessions);
            let id = entry.id.clone();
            tokio::spawn(async move {
                sessions.write().await.remove(&id);
                tracing::debug!("expired session evicted on read");
            });
            return None;
        }

        entry.last_accessed_ms.store(now.timestamp_millis(), Ordering::Relaxed);
        Some(entry.snapshot())
    }

    /// Remove a session. Missing IDs are ignored.
    pub async fn delete(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop every expired session and return how many were removed.
    pub async fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(now));
        before - sessions.len()
    }
}

/// Spawn the periodic expiry sweep. Stops when `shutdown` is cancelled.
pub fn spawn_sweeper(
    tracker: Arc<SessionTracker>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = timer.tick() => {}
            }

            let removed = tracker.sweep_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "swept expired sessions");
            }
        }
    })
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
