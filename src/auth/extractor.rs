// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors over the identity published by the authenticator.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is Identity
//! }
//! ```
//!
//! These extractors never decode tokens themselves; they read the
//! [`RequestIdentity`] the middleware placed in the request extensions.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{
    claims::{Identity, RequestIdentity},
    middleware::bearer_token,
    roles::Role,
    AuthError,
};

fn established_identity(parts: &Parts) -> Option<Identity> {
    parts
        .extensions
        .get::<RequestIdentity>()
        .and_then(RequestIdentity::identity)
        .cloned()
}

/// Extractor for authenticated users.
pub struct Auth(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        established_identity(parts)
            .map(Auth)
            .ok_or(AuthError::MissingCredentialHeader)
    }
}

/// Extractor that requires admin role.
pub struct AdminOnly(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.has_role(Role::Admin) {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(user))
    }
}

/// Extractor that requires library staff (librarian or admin).
pub struct StaffOnly(pub Identity);

impl<S: Send + Sync> FromRequestParts<S> for StaffOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.has_role(Role::Librarian) {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(StaffOnly(user))
    }
}

/// Optional authentication extractor.
///
/// Returns `None` for anonymous requests instead of rejecting.
pub struct OptionalAuth(pub Option<Identity>);

impl<S: Send + Sync> FromRequestParts<S> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(established_identity(parts)))
    }
}

/// Raw bearer token from the `Authorization` header.
///
/// Only for endpoints that must inspect the token themselves (logout).
pub struct BearerToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match bearer_token(&parts.headers) {
            Some(token) if !token.is_empty() => Ok(BearerToken(token.to_string())),
            Some(_) => Err(AuthError::InvalidAuthHeader),
            None if parts.headers.contains_key(axum::http::header::AUTHORIZATION) => {
                Err(AuthError::InvalidAuthHeader)
            }
            None => Err(AuthError::MissingCredentialHeader),
        }
    }
}
