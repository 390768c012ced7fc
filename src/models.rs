// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wire types shared by the HTTP API and the client session manager.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub nick: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Signed bearer token
    pub token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Token identifier (revocation key)
    pub token_id: String,
    pub subject: String,
    pub role: Role,
    /// Unix timestamp after which the token is no longer accepted
    pub expires_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub nick: String,
    pub password: String,
}

/// Result of a revocation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RevocationStatus {
    /// The token id is now in the registry
    Revoked,
    /// The token had already expired; nothing to record
    AlreadyExpired,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub token_id: String,
    pub status: RevocationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminRevokeRequest {
    pub token_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminRevokeResponse {
    pub token_id: String,
    /// False when the id was already revoked
    pub newly_revoked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RevocationStats {
    /// Entries currently held in the registry
    pub revoked_tokens: usize,
}
