// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! [`authenticate`] runs once per request and walks the token through its
//! gates:
//!
//! ```text
//! Unauthenticated -> HeaderChecked -> SignatureVerified -> ExpiryChecked
//!                 -> RevocationChecked -> IdentityEstablished
//! ```
//!
//! Any gate may reject. A missing header, a malformed token and an expired
//! token all degrade to [`RequestIdentity::Anonymous`] and the request carries
//! on, so route authorization produces the final 401/403. A revoked token is
//! the one hard stop: the request is answered with `token_revoked` at once.
//!
//! Exempt routes (registration) skip the whole pipeline.
//!
//! [`authorize`] is the downstream route authorization: anonymous callers are
//! only let through on routes the [`PublicRoutes`](super::PublicRoutes)
//! allow-list names.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/v1/users/me", get(me))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), authorize))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), authenticate))
//!     .with_state(state);
//! ```

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{debug, info, warn};

use super::{
    claims::{Identity, RequestIdentity},
    codec::TokenError,
    AuthError, RevocationRegistry, TokenCodec,
};
use crate::state::AppState;

/// Authorization scheme accepted in the `Authorization` header.
const BEARER_SCHEME: &str = "Bearer";

/// Return the bearer token in `headers`, if any.
///
/// Anything other than `Bearer <token>` (another scheme, non-ASCII bytes) is
/// treated as no bearer credential at all.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    Some(token.trim())
}

/// Run the token pipeline against request headers.
///
/// `Err` only for a revoked token; every other failure is `Anonymous`.
pub fn evaluate(
    codec: &TokenCodec,
    revocations: &RevocationRegistry,
    headers: &HeaderMap,
) -> Result<RequestIdentity, AuthError> {
    evaluate_at(codec, revocations, headers, Utc::now().timestamp())
}

pub(crate) fn evaluate_at(
    codec: &TokenCodec,
    revocations: &RevocationRegistry,
    headers: &HeaderMap,
    now: i64,
) -> Result<RequestIdentity, AuthError> {
    let Some(token) = bearer_token(headers) else {
        return Ok(RequestIdentity::Anonymous);
    };

    let decoded = match codec.decode_at(token, now) {
        Ok(decoded) => decoded,
        Err(TokenError::Expired {
            token_id,
            expired_at,
        }) => {
            info!(%token_id, expired_at, "Expired token presented, continuing as anonymous");
            return Ok(RequestIdentity::Anonymous);
        }
        Err(e) => {
            debug!(error = %e, "Rejected bearer token, continuing as anonymous");
            return Ok(RequestIdentity::Anonymous);
        }
    };

    if revocations.is_revoked(&decoded.token_id) {
        warn!(
            token_id = %decoded.token_id,
            subject = %decoded.subject,
            "Revoked token presented"
        );
        return Err(AuthError::RevokedToken);
    }

    Ok(RequestIdentity::Authenticated(Identity::from_claims(
        decoded.into_claims(),
    )))
}

/// Authentication middleware function.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if state
        .routes
        .is_exempt(request.method(), request.uri().path())
    {
        return next.run(request).await;
    }

    let already_established = request
        .extensions()
        .get::<RequestIdentity>()
        .is_some_and(RequestIdentity::is_authenticated);
    if already_established {
        return next.run(request).await;
    }

    match evaluate(&state.codec, &state.revocations, request.headers()) {
        Ok(identity) => {
            if let RequestIdentity::Authenticated(ref user) = identity {
                debug!(subject = %user.subject, role = %user.role, "Identity established");
            }
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Route authorization: anonymous callers only reach public routes.
pub async fn authorize(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if state
        .routes
        .is_public(request.method(), request.uri().path())
    {
        return next.run(request).await;
    }

    let authenticated = request
        .extensions()
        .get::<RequestIdentity>()
        .is_some_and(RequestIdentity::is_authenticated);
    if !authenticated {
        debug!(path = %request.uri().path(), "Anonymous request to protected route");
        return AuthError::MissingCredentialHeader.into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use axum::http::HeaderValue;
    use std::time::Duration;

    const SECRET: &[u8] = b"middleware-test-secret-32-bytes-long";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers_with("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers_with("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn no_header_is_anonymous() {
        let codec = TokenCodec::new(SECRET);
        let registry = RevocationRegistry::new();
        let result = evaluate(&codec, &registry, &HeaderMap::new()).unwrap();
        assert_eq!(result, RequestIdentity::Anonymous);
    }

    #[test]
    fn valid_token_establishes_identity() {
        let codec = TokenCodec::new(SECRET);
        let registry = RevocationRegistry::new();
        let issued = codec.issue("reader", Role::Member).unwrap();

        let headers = headers_with(&format!("Bearer {}", issued.token));
        let identity = evaluate(&codec, &registry, &headers).unwrap();
        let identity = identity.identity().cloned().unwrap();
        assert_eq!(identity.subject, "reader");
        assert_eq!(identity.token_id, issued.token_id);
        assert_eq!(identity.expires_at, issued.expires_at);
    }

    #[test]
    fn malformed_token_is_anonymous() {
        let codec = TokenCodec::new(SECRET);
        let registry = RevocationRegistry::new();
        let result = evaluate(&codec, &registry, &headers_with("Bearer garbage")).unwrap();
        assert_eq!(result, RequestIdentity::Anonymous);
    }

    #[test]
    fn expired_token_is_anonymous_even_if_revoked() {
        let codec = TokenCodec::new(SECRET).with_ttl(Duration::from_secs(60));
        let registry = RevocationRegistry::new();
        let issued = codec.issue_at("reader", Role::Member, 1_000).unwrap();
        registry.revoke(&issued.token_id, issued.expires_at);

        let headers = headers_with(&format!("Bearer {}", issued.token));
        let result = evaluate_at(&codec, &registry, &headers, 2_000).unwrap();
        assert_eq!(result, RequestIdentity::Anonymous);
    }

    #[test]
    fn revoked_token_is_rejected_despite_valid_signature_and_expiry() {
        let codec = TokenCodec::new(SECRET);
        let registry = RevocationRegistry::new();
        let issued = codec.issue("admin", Role::Admin).unwrap();

        assert_eq!(codec.decode(&issued.token).unwrap().subject, "admin");
        registry.revoke(&issued.token_id, issued.expires_at);
        // The codec alone still accepts it.
        assert!(codec.decode(&issued.token).is_ok());

        let headers = headers_with(&format!("Bearer {}", issued.token));
        let result = evaluate(&codec, &registry, &headers);
        assert!(matches!(result, Err(AuthError::RevokedToken)));
    }

    #[test]
    fn token_signed_with_other_secret_is_anonymous() {
        let codec = TokenCodec::new(SECRET);
        let other = TokenCodec::new(b"some-other-secret-also-32-bytes-long");
        let registry = RevocationRegistry::new();
        let forged = other.issue("admin", Role::Admin).unwrap();

        let headers = headers_with(&format!("Bearer {}", forged.token));
        let result = evaluate(&codec, &registry, &headers).unwrap();
        assert_eq!(result, RequestIdentity::Anonymous);
    }

    #[tokio::test]
    async fn established_identity_is_never_overwritten() {
        use crate::auth::Auth;
        use crate::state::test_support::test_state;
        use axum::{
            body::{to_bytes, Body},
            http::StatusCode,
            middleware::from_fn,
            routing::get,
            Router,
        };
        use tower::ServiceExt;

        async fn preset_identity(mut request: Request, next: Next) -> Response {
            request
                .extensions_mut()
                .insert(RequestIdentity::Authenticated(Identity {
                    subject: "preset".to_string(),
                    role: Role::Librarian,
                    token_id: "preset-token".to_string(),
                    expires_at: i64::MAX,
                }));
            next.run(request).await
        }

        async fn whoami(Auth(user): Auth) -> String {
            format!("{}:{}", user.subject, user.token_id)
        }

        let state = test_state();
        let other = state.codec.issue("someone-else", Role::Admin).unwrap();
        let app = Router::new()
            .route("/v1/users/me", get(whoami))
            .layer(axum::middleware::from_fn_with_state(state.clone(), authenticate))
            .layer(from_fn(preset_identity))
            .with_state(state);

        let request = axum::http::Request::builder()
            .uri("/v1/users/me")
            .header(AUTHORIZATION, format!("Bearer {}", other.token))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"preset:preset-token");
    }
}
