// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login and logout endpoints.

use axum::{extract::State, Json};
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    auth::{AuthError, BearerToken, OptionalAuth},
    models::{LoginRequest, LoginResponse, LogoutResponse, RevocationStatus},
    state::AppState,
};

/// Exchange nick + password for a bearer token.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid nick or password"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let principal = state
        .credentials
        .authenticate(&request.nick, &request.password)
        .inspect_err(|e| warn!(nick = %request.nick, error = %e, "Login failed"))?;

    let issued = state.codec.issue(&principal.subject, principal.role)?;

    info!(
        subject = %issued.subject,
        token_id = %issued.token_id,
        expires_at = issued.expires_at,
        "Token issued"
    );

    Ok(Json(LoginResponse {
        token: issued.token,
        token_type: "Bearer".to_string(),
        token_id: issued.token_id,
        subject: issued.subject,
        role: issued.role,
        expires_at: issued.expires_at,
    }))
}

/// Revoke the caller's own token.
///
/// Succeeds for a token that has already expired; there is nothing left to
/// revoke, so nothing is recorded.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Token revoked or already expired", body = LogoutResponse),
        (status = 401, description = "Missing, malformed or revoked token"),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
    BearerToken(token): BearerToken,
) -> Result<Json<LogoutResponse>, AuthError> {
    let (token_id, subject, expires_at) = match identity {
        Some(identity) => (identity.token_id, identity.subject, identity.expires_at),
        None => {
            // Expired tokens arrive here as anonymous; the signature still has to verify.
            let decoded = state.codec.decode_allow_expired(&token)?;
            (decoded.token_id, decoded.subject, decoded.expires_at)
        }
    };

    if expires_at <= Utc::now().timestamp() {
        info!(%token_id, %subject, "Logout with expired token, nothing to revoke");
        return Ok(Json(LogoutResponse {
            token_id,
            status: RevocationStatus::AlreadyExpired,
        }));
    }

    state.revocations.revoke(&token_id, expires_at);
    info!(%token_id, %subject, "Logout: token revoked");

    Ok(Json(LogoutResponse {
        token_id,
        status: RevocationStatus::Revoked,
    }))
}
