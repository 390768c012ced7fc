// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::codec::TokenError;
use super::credentials::CredentialError;

/// Authentication error type.
///
/// `MalformedToken` and `ExpiredToken` are normally absorbed by the
/// authenticator (the request continues as anonymous). They still render
/// when an endpoint inspects the bearer token itself, as logout does.
#[derive(Debug)]
pub enum AuthError {
    /// No bearer credential on a route that needs one
    MissingCredentialHeader,
    /// Authorization header present but not `Bearer <token>`
    InvalidAuthHeader,
    /// Token could not be parsed or its signature did not verify
    MalformedToken,
    /// Token has expired
    ExpiredToken,
    /// Token id is in the revocation registry
    RevokedToken,
    /// Nick or password did not match
    InvalidCredentials,
    /// Insufficient permissions
    InsufficientPermissions,
    /// Internal error
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredentialHeader => "missing_credential_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::ExpiredToken => "token_expired",
            AuthError::RevokedToken => "token_revoked",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InsufficientPermissions => "insufficient_permissions",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentialHeader
            | AuthError::InvalidAuthHeader
            | AuthError::MalformedToken
            | AuthError::ExpiredToken
            | AuthError::RevokedToken
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredentialHeader => write!(f, "Authentication is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::MalformedToken => write!(f, "Token is malformed"),
            AuthError::ExpiredToken => write!(f, "Token has expired"),
            AuthError::RevokedToken => write!(f, "Token has been revoked"),
            AuthError::InvalidCredentials => write!(f, "Invalid nick or password"),
            AuthError::InsufficientPermissions => {
                write!(f, "Insufficient permissions for this operation")
            }
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Malformed(_) => AuthError::MalformedToken,
            TokenError::Expired { .. } => AuthError::ExpiredToken,
            TokenError::Encoding(msg) => AuthError::InternalError(msg),
        }
    }
}

impl From<CredentialError> for AuthError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::InvalidCredentials => AuthError::InvalidCredentials,
            other => AuthError::InternalError(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
