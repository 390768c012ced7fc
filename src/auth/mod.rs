// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless bearer-token authentication with server-side revocation.
//!
//! ## Auth Flow
//!
//! 1. Client posts nick + password to `/v1/auth/login`
//! 2. The credential store verifies them and returns the subject and role
//! 3. The token codec issues an HS256 JWT (`sub`, `jti`, `iat`, `exp`, `role`)
//! 4. Client sends `Authorization: Bearer <token>` on every later call
//! 5. The authenticator middleware, per request:
//!    - verifies signature, then expiry
//!    - looks the `jti` up in the revocation registry
//!    - publishes `Identity` or `Anonymous` for route authorization
//! 6. `/v1/auth/logout` puts the caller's own `jti` in the registry
//!
//! ## Security
//!
//! - The signing secret comes from configuration, never from source
//! - Malformed and expired tokens downgrade to anonymous
//! - Revoked tokens are refused outright with `token_revoked`
//! - Registration is the only route that bypasses the authenticator

pub mod claims;
pub mod codec;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod revocation;
pub mod roles;
pub mod routes;

pub use claims::{Claims, Identity, RequestIdentity};
pub use codec::{DecodedToken, IssuedToken, TokenCodec, TokenError};
pub use credentials::{CredentialError, CredentialStore, InMemoryCredentialStore, Principal};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, BearerToken, OptionalAuth, StaffOnly};
pub use revocation::{RevocationRegistry, RevocationSweeper};
pub use roles::Role;
pub use routes::PublicRoutes;
