// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Client Session Manager
//!
//! Client-side holder of the current token. It knows whether a session is
//! active, persists the token across restarts, and on teardown asks the
//! server to revoke it.
//!
//! Teardown is bounded: the remote call is given [`DEFAULT_TEARDOWN_TIMEOUT`]
//! (configurable) and the local token is cleared whatever happens, including
//! when the teardown future itself is dropped before completion.

use std::time::Duration;

use tracing::{debug, info, warn};

pub mod client;
pub mod store;

pub use client::{LibraryClient, RemoteRevoker};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};

use crate::models::LoginResponse;

/// Upper bound on the remote revocation call during teardown.
pub const DEFAULT_TEARDOWN_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Remote revocation unreachable: {0}")]
    RemoteRevocationUnreachable(String),

    #[error("Server rejected the request ({status}): {message}")]
    RemoteRejected { status: u16, message: String },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// How a teardown ended. The local token is cleared in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownOutcome {
    /// Nothing was stored.
    NoSession,
    /// The server confirmed the revocation.
    Revoked,
    /// The server could not be reached or refused the request.
    RemoteFailed,
    /// The server did not answer within the teardown timeout.
    TimedOut,
}

pub struct SessionManager<S, R> {
    store: S,
    remote: R,
    teardown_timeout: Duration,
}

impl<S, R> SessionManager<S, R>
where
    S: TokenStore,
    R: RemoteRevoker,
{
    pub fn new(store: S, remote: R) -> Self {
        Self {
            store,
            remote,
            teardown_timeout: DEFAULT_TEARDOWN_TIMEOUT,
        }
    }

    pub fn with_teardown_timeout(mut self, timeout: Duration) -> Self {
        self.teardown_timeout = timeout;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// True when a non-empty token is stored.
    ///
    /// A store that cannot be read counts as no session.
    pub fn has_active_session(&self) -> bool {
        match self.store.load() {
            Ok(token) => token.is_some(),
            Err(e) => {
                warn!(error = %e, "Failed to read session store");
                false
            }
        }
    }

    pub fn current_token(&self) -> Result<Option<String>, SessionError> {
        self.store.load()
    }

    /// Persist `token` as the current session, replacing any previous one.
    pub fn save(&self, token: &str) -> Result<(), SessionError> {
        self.store.save(token)?;
        debug!("Session token saved");
        Ok(())
    }

    /// Drop the local token without contacting the server.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.store.clear()?;
        debug!("Session token cleared");
        Ok(())
    }

    /// Revoke the current token remotely and clear it locally.
    ///
    /// Never fails and never outlives the teardown timeout. If this future is
    /// dropped early the local token is still cleared.
    pub async fn on_teardown(&self) -> TeardownOutcome {
        let _clear = ClearOnDrop { store: &self.store };

        let token = match self.store.load() {
            Ok(Some(token)) => token,
            Ok(None) => return TeardownOutcome::NoSession,
            Err(e) => {
                warn!(error = %e, "Failed to read session store during teardown");
                return TeardownOutcome::NoSession;
            }
        };

        match tokio::time::timeout(self.teardown_timeout, self.remote.revoke(&token)).await {
            Ok(Ok(())) => {
                info!("Session revoked on server");
                TeardownOutcome::Revoked
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Remote revocation failed; clearing local session");
                TeardownOutcome::RemoteFailed
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.teardown_timeout.as_millis() as u64,
                    "Remote revocation timed out; clearing local session"
                );
                TeardownOutcome::TimedOut
            }
        }
    }
}

impl<S: TokenStore> SessionManager<S, LibraryClient> {
    /// Log in against the server and persist the issued token.
    pub async fn login(&self, nick: &str, password: &str) -> Result<LoginResponse, SessionError> {
        let response = self.remote.login(nick, password).await?;
        self.save(&response.token)?;
        info!(subject = %response.subject, expires_at = response.expires_at, "Session started");
        Ok(response)
    }
}

struct ClearOnDrop<'a, S: TokenStore> {
    store: &'a S,
}

impl<S: TokenStore> Drop for ClearOnDrop<'_, S> {
    fn drop(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear session store");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    use tempfile::TempDir;
    use tokio::net::TcpListener;

    use crate::api::router;
    use crate::state::test_support::test_state;

    #[derive(Default)]
    struct RecordingRevoker {
        calls: AtomicUsize,
    }

    impl RemoteRevoker for RecordingRevoker {
        async fn revoke(&self, _token: &str) -> Result<(), SessionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingRevoker;

    impl RemoteRevoker for FailingRevoker {
        async fn revoke(&self, _token: &str) -> Result<(), SessionError> {
            Err(SessionError::RemoteRevocationUnreachable(
                "connection refused".to_string(),
            ))
        }
    }

    /// Never answers.
    struct HangingRevoker;

    impl RemoteRevoker for HangingRevoker {
        async fn revoke(&self, _token: &str) -> Result<(), SessionError> {
            std::future::pending().await
        }
    }

    #[test]
    fn save_and_clear_toggle_active_session() {
        let manager = SessionManager::new(MemoryTokenStore::new(), RecordingRevoker::default());
        assert!(!manager.has_active_session());

        manager.save("token").unwrap();
        assert!(manager.has_active_session());
        assert_eq!(manager.current_token().unwrap().as_deref(), Some("token"));

        manager.clear().unwrap();
        assert!(!manager.has_active_session());
    }

    #[tokio::test]
    async fn teardown_without_session_skips_remote() {
        let manager = SessionManager::new(MemoryTokenStore::new(), RecordingRevoker::default());
        assert_eq!(manager.on_teardown().await, TeardownOutcome::NoSession);
        assert_eq!(manager.remote().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn teardown_revokes_and_clears() {
        let manager = SessionManager::new(MemoryTokenStore::new(), RecordingRevoker::default());
        manager.save("token").unwrap();

        assert_eq!(manager.on_teardown().await, TeardownOutcome::Revoked);
        assert_eq!(manager.remote().calls.load(Ordering::SeqCst), 1);
        assert!(!manager.has_active_session());
    }

    #[tokio::test]
    async fn teardown_clears_when_remote_fails() {
        let manager = SessionManager::new(MemoryTokenStore::new(), FailingRevoker);
        manager.save("token").unwrap();

        assert_eq!(manager.on_teardown().await, TeardownOutcome::RemoteFailed);
        assert!(!manager.has_active_session());
    }

    #[tokio::test]
    async fn teardown_is_bounded_when_remote_hangs() {
        let manager = SessionManager::new(MemoryTokenStore::new(), HangingRevoker)
            .with_teardown_timeout(Duration::from_millis(100));
        manager.save("token").unwrap();

        let started = Instant::now();
        assert_eq!(manager.on_teardown().await, TeardownOutcome::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!manager.has_active_session());
    }

    #[tokio::test]
    async fn dropped_teardown_still_clears() {
        let manager = SessionManager::new(MemoryTokenStore::new(), HangingRevoker)
            .with_teardown_timeout(Duration::from_secs(60));
        manager.save("token").unwrap();

        let result =
            tokio::time::timeout(Duration::from_millis(50), manager.on_teardown()).await;
        assert!(result.is_err());
        assert!(!manager.has_active_session());
    }

    #[tokio::test]
    async fn teardown_against_unreachable_server_clears() {
        let dir = TempDir::new().unwrap();
        let client = LibraryClient::new("http://127.0.0.1:1").unwrap();
        let manager = SessionManager::new(FileTokenStore::in_dir(dir.path()), client)
            .with_teardown_timeout(Duration::from_secs(5));
        manager.save("token").unwrap();

        let outcome = manager.on_teardown().await;
        assert!(matches!(
            outcome,
            TeardownOutcome::RemoteFailed | TeardownOutcome::TimedOut
        ));
        assert!(!manager.has_active_session());
        assert!(!manager.store().path().exists());
    }

    #[tokio::test]
    async fn login_then_teardown_revokes_on_server() {
        let state = test_state();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let dir = TempDir::new().unwrap();
        let client = LibraryClient::new(&format!("http://{addr}")).unwrap();
        let manager = SessionManager::new(FileTokenStore::in_dir(dir.path()), client);

        let login = manager.login("reader", "reader-password").await.unwrap();
        assert!(manager.has_active_session());
        assert!(!state.revocations.is_revoked(&login.token_id));

        // A restarted client picks the session back up from disk.
        let reopened = SessionManager::new(
            FileTokenStore::in_dir(dir.path()),
            LibraryClient::new(&format!("http://{addr}")).unwrap(),
        );
        assert!(reopened.has_active_session());

        assert_eq!(manager.on_teardown().await, TeardownOutcome::Revoked);
        assert!(!manager.has_active_session());
        assert!(!reopened.has_active_session());
        assert!(state.revocations.is_revoked(&login.token_id));
    }

    #[tokio::test]
    async fn login_with_wrong_password_keeps_no_session() {
        let state = test_state();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        let client = LibraryClient::new(&format!("http://{addr}")).unwrap();
        let manager = SessionManager::new(MemoryTokenStore::new(), client);

        let err = manager.login("reader", "wrong-password").await.unwrap_err();
        assert!(matches!(err, SessionError::RemoteRejected { status: 401, .. }));
        assert!(!manager.has_active_session());
    }
}
