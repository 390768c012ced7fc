// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only API endpoints for token revocation.
//!
//! - Administrative revocation of any token by id (admin)
//! - Revocation registry statistics (librarian or admin)

use axum::{extract::State, Json};
use chrono::Utc;
use tracing::info;

use crate::{
    auth::{AdminOnly, StaffOnly},
    error::ApiError,
    models::{AdminRevokeRequest, AdminRevokeResponse, RevocationStats},
    state::AppState,
};

/// Revoke a token by id on behalf of its owner.
#[utoipa::path(
    post,
    path = "/v1/admin/revocations",
    tag = "Admin",
    security(("bearer" = [])),
    request_body = AdminRevokeRequest,
    responses(
        (status = 200, description = "Token id revoked", body = AdminRevokeResponse),
        (status = 400, description = "Empty token id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
    )
)]
pub async fn revoke_token(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<AdminRevokeRequest>,
) -> Result<Json<AdminRevokeResponse>, ApiError> {
    let token_id = request.token_id.trim();
    if token_id.is_empty() {
        return Err(ApiError::bad_request("token_id must not be empty"));
    }

    // The token's own expiry is unknown here; no token with this id can
    // outlive now + ttl.
    let expires_at = Utc::now()
        .timestamp()
        .saturating_add(state.codec.ttl_secs());

    let newly_revoked = state.revocations.revoke(token_id, expires_at);
    info!(
        admin = %admin.subject,
        token_id,
        newly_revoked,
        "Administrative revocation"
    );

    Ok(Json(AdminRevokeResponse {
        token_id: token_id.to_string(),
        newly_revoked,
    }))
}

/// Revocation registry statistics.
#[utoipa::path(
    get,
    path = "/v1/admin/revocations",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Registry statistics", body = RevocationStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Librarian role required"),
    )
)]
pub async fn revocation_stats(
    StaffOnly(_staff): StaffOnly,
    State(state): State<AppState>,
) -> Json<RevocationStats> {
    Json(RevocationStats {
        revoked_tokens: state.revocations.len(),
    })
}
