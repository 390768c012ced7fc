// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::{
    auth::{Auth, Identity, Principal, Role},
    error::ApiError,
    models::RegisterRequest,
    state::AppState,
};

/// Response for GET /v1/users/me
#[derive(Debug, Serialize, ToSchema)]
pub struct UserMeResponse {
    /// Subject from the token
    pub subject: String,
    /// User's role
    pub role: Role,
    /// Identifier of the token used for this request
    pub token_id: String,
    /// Token expiry (Unix timestamp)
    pub expires_at: i64,
}

impl From<Identity> for UserMeResponse {
    fn from(user: Identity) -> Self {
        Self {
            subject: user.subject,
            role: user.role,
            token_id: user.token_id,
            expires_at: user.expires_at,
        }
    }
}

/// Register a new member account.
///
/// This route bypasses the authenticator entirely; any Authorization header
/// sent with it is ignored.
#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = Principal),
        (status = 409, description = "Nick already registered"),
        (status = 422, description = "Invalid nick or password"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Principal>), ApiError> {
    let principal = state
        .credentials
        .register(&request.nick, &request.password, Role::Member)?;

    info!(subject = %principal.subject, nick = %principal.nick, "Account registered");
    Ok((StatusCode::CREATED, Json(principal)))
}

/// Get the current authenticated user's information.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User information", body = UserMeResponse),
        (status = 401, description = "Unauthorized - missing, invalid or revoked token"),
    )
)]
pub async fn get_current_user(Auth(user): Auth) -> Json<UserMeResponse> {
    Json(user.into())
}
