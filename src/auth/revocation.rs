// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Revocation Registry
//!
//! In-memory record of token identifiers that must no longer be honored.
//!
//! Signed tokens validate themselves, so logout can only take effect if every
//! request also checks the token id against this registry. The registry is
//! built once at startup, shared through `Arc`, and lives for the lifetime of
//! the process. It is never persisted and is not shared between instances.
//!
//! ## Consistency
//!
//! `revoke` completes its insert before returning, and `is_revoked` reads the
//! same shard, so once `revoke` has returned every later lookup from any task
//! sees the id. Lookups never `.await` and never touch I/O.
//!
//! ## Memory
//!
//! Each entry remembers the expiry of the token it revokes. Once that expiry
//! has passed the codec rejects the token anyway, so `purge_expired` can drop
//! the entry. `RevocationSweeper` runs that purge on an interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Default interval between purge sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Concurrent set of revoked token identifiers.
#[derive(Debug, Default)]
pub struct RevocationRegistry {
    /// token id -> expiry of the revoked token (Unix seconds)
    revoked: DashMap<String, i64>,
}

impl RevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `token_id` as revoked.
    ///
    /// Idempotent. Returns `true` if the id was not already present. When the
    /// same id is revoked twice the later expiry wins, so an entry is never
    /// purged earlier than any caller asked for.
    pub fn revoke(&self, token_id: &str, expires_at: i64) -> bool {
        let mut newly_revoked = false;
        self.revoked
            .entry(token_id.to_string())
            .and_modify(|existing| *existing = (*existing).max(expires_at))
            .or_insert_with(|| {
                newly_revoked = true;
                expires_at
            });

        if newly_revoked {
            debug!(token_id, expires_at, "Token revoked");
        }
        newly_revoked
    }

    /// Whether `token_id` has been revoked.
    pub fn is_revoked(&self, token_id: &str) -> bool {
        self.revoked.contains_key(token_id)
    }

    /// Drop entries whose token expiry is at or before `now`.
    pub fn purge_expired(&self, now: i64) -> usize {
        let before = self.revoked.len();
        self.revoked.retain(|_, expires_at| *expires_at > now);
        before.saturating_sub(self.revoked.len())
    }

    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}

/// Background task that evicts revocations for tokens that have expired.
pub struct RevocationSweeper {
    registry: Arc<RevocationRegistry>,
    interval: Duration,
}

impl RevocationSweeper {
    pub fn new(registry: Arc<RevocationRegistry>) -> Self {
        Self {
            registry,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until the cancellation token is triggered.
    ///
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Revocation sweeper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Revocation sweeper shutting down");
                    return;
                }
            }

            self.sweep_step();
        }
    }

    fn sweep_step(&self) {
        let purged = self.registry.purge_expired(Utc::now().timestamp());
        if purged > 0 {
            info!(
                purged,
                remaining = self.registry.len(),
                "Revocation sweeper: evicted expired entries"
            );
        }
    }
}
