// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and the request-scoped identity derived from them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claim set carried by every token this service issues.
///
/// All fields are covered by the HS256 signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (stable user identifier from the credential store)
    pub sub: String,

    /// Token identifier, unique per issuance; the revocation key
    pub jti: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Role granted at login
    #[serde(default)]
    pub role: Role,
}

/// Identity established for a request whose token passed every check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    /// Subject (user ID)
    pub subject: String,

    /// User's role
    pub role: Role,

    /// Identifier of the token that authenticated this request
    pub token_id: String,

    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

impl Identity {
    /// Build from verified claims.
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            role: claims.role,
            token_id: claims.jti,
            expires_at: claims.exp,
        }
    }

    /// Check if the user has the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }
}

/// What the authenticator publishes for downstream authorization.
///
/// Inserted into the request extensions exactly once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestIdentity {
    Authenticated(Identity),
    Anonymous,
}

impl RequestIdentity {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            RequestIdentity::Authenticated(identity) => Some(identity),
            RequestIdentity::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, RequestIdentity::Authenticated(_))
    }
}
