// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential store collaborator.
//!
//! Login hands a nick and password to a [`CredentialStore`]; on success the
//! returned [`Principal`] is wrapped into a token by the codec. How passwords
//! are hashed is the store's business. The in-memory store here keys an
//! HMAC-SHA256 with a per-account salt, which is enough for a single process
//! and for tests.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use utoipa::ToSchema;
use uuid::Uuid;

use super::roles::Role;

type HmacSha256 = Hmac<Sha256>;

/// Minimum accepted password length at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Account identity returned by a successful credential check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Principal {
    /// Stable subject identifier embedded in tokens
    pub subject: String,
    /// Login nick
    pub nick: String,
    /// Account role
    pub role: Role,
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Invalid nick or password")]
    InvalidCredentials,

    #[error("Nick already registered: {0}")]
    NickTaken(String),

    #[error("Invalid registration: {0}")]
    InvalidInput(String),

    #[error("Credential store failure: {0}")]
    Backend(String),
}

/// Verifies nick + password pairs and registers new accounts.
pub trait CredentialStore: Send + Sync {
    /// Check a nick + password and return the account on success.
    fn authenticate(&self, nick: &str, password: &str) -> Result<Principal, CredentialError>;

    /// Create an account. Nicks are unique.
    fn register(&self, nick: &str, password: &str, role: Role)
        -> Result<Principal, CredentialError>;
}

struct StoredAccount {
    principal: Principal,
    salt: String,
    digest: Vec<u8>,
}

/// Process-local credential store.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    accounts: DashMap<String, StoredAccount>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn digest(salt: &str, password: &str) -> Result<Vec<u8>, CredentialError> {
        let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
            .map_err(|e| CredentialError::Backend(e.to_string()))?;
        mac.update(password.as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn verify(salt: &str, password: &str, expected: &[u8]) -> Result<bool, CredentialError> {
        let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
            .map_err(|e| CredentialError::Backend(e.to_string()))?;
        mac.update(password.as_bytes());
        Ok(mac.verify_slice(expected).is_ok())
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn authenticate(&self, nick: &str, password: &str) -> Result<Principal, CredentialError> {
        let account = self
            .accounts
            .get(nick)
            .ok_or(CredentialError::InvalidCredentials)?;

        if Self::verify(&account.salt, password, &account.digest)? {
            Ok(account.principal.clone())
        } else {
            Err(CredentialError::InvalidCredentials)
        }
    }

    fn register(
        &self,
        nick: &str,
        password: &str,
        role: Role,
    ) -> Result<Principal, CredentialError> {
        let nick = nick.trim();
        if nick.is_empty() {
            return Err(CredentialError::InvalidInput("nick must not be empty".into()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(CredentialError::InvalidInput(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let salt = Uuid::new_v4().simple().to_string();
        let digest = Self::digest(&salt, password)?;
        let principal = Principal {
            subject: Uuid::new_v4().to_string(),
            nick: nick.to_string(),
            role,
        };

        match self.accounts.entry(nick.to_string()) {
            Entry::Occupied(_) => Err(CredentialError::NickTaken(nick.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(StoredAccount {
                    principal: principal.clone(),
                    salt,
                    digest,
                });
                Ok(principal)
            }
        }
    }
}
