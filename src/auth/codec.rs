// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and decoding.
//!
//! Tokens are HS256-signed JWTs carrying `sub`, `jti`, `iat`, `exp` and
//! `role`. Decoding verifies the signature before any claim is trusted and
//! then applies a strict expiry check (`now < exp`, no leeway). The codec
//! knows nothing about revocation; that lookup belongs to the authenticator.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::claims::Claims;
use super::roles::Role;

/// Default validity window for issued tokens (24 hours).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Errors produced by the token codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Structure could not be parsed or the signature did not verify.
    #[error("Token is malformed: {0}")]
    Malformed(String),

    /// Signature is valid but the expiry has passed.
    #[error("Token {token_id} expired at {expired_at}")]
    Expired { token_id: String, expired_at: i64 },

    /// The signer failed to produce a token.
    #[error("Failed to encode token: {0}")]
    Encoding(String),
}

/// A freshly issued token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub token_id: String,
    pub subject: String,
    pub role: Role,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Claims recovered from a token whose signature verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub subject: String,
    pub token_id: String,
    pub role: Role,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl DecodedToken {
    /// Whether the token is past its expiry at `now` (Unix seconds).
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// Turn the decoded token back into its claim set.
    pub fn into_claims(self) -> Claims {
        Claims {
            sub: self.subject,
            jti: self.token_id,
            iat: self.issued_at,
            exp: self.expires_at,
            role: self.role,
        }
    }
}

impl From<Claims> for DecodedToken {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            token_id: claims.jti,
            role: claims.role,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}

/// Signs and verifies tokens with a single shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec for the given HMAC secret with the default 24h window.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by hand after the signature so the boundary is
        // exactly `now < exp` and the token id is still available for logging.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Override the validity window.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Validity window applied to newly issued tokens.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Validity window in whole seconds, saturating at `i64::MAX`.
    pub fn ttl_secs(&self) -> i64 {
        i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)
    }

    /// Issue a token for `subject` valid from now until now + ttl.
    pub fn issue(&self, subject: &str, role: Role) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, role, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `issued_at`.
    pub(crate) fn issue_at(
        &self,
        subject: &str,
        role: Role,
        issued_at: i64,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = issued_at.saturating_add(self.ttl_secs());
        let claims = Claims {
            sub: subject.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: issued_at,
            exp: expires_at,
            role,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(IssuedToken {
            token,
            token_id: claims.jti,
            subject: claims.sub,
            role,
            issued_at,
            expires_at,
        })
    }

    /// Verify signature and expiry.
    pub fn decode(&self, token: &str) -> Result<DecodedToken, TokenError> {
        self.decode_at(token, Utc::now().timestamp())
    }

    /// Verify signature and expiry against an explicit `now`.
    pub fn decode_at(&self, token: &str, now: i64) -> Result<DecodedToken, TokenError> {
        let decoded = self.decode_allow_expired(token)?;
        if decoded.is_expired_at(now) {
            return Err(TokenError::Expired {
                token_id: decoded.token_id,
                expired_at: decoded.expires_at,
            });
        }
        Ok(decoded)
    }

    /// Verify the signature only; expired tokens are returned as-is.
    ///
    /// Used where an already-expired token is still meaningful, such as a
    /// logout that arrives after the token lapsed.
    pub fn decode_allow_expired(&self, token: &str) -> Result<DecodedToken, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;
        Ok(data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    const SECRET: &[u8] = b"test-secret-that-is-at-least-32-bytes!!";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET)
    }

    #[test]
    fn issue_then_decode_returns_subject_and_token_id() {
        let codec = codec();
        let issued = codec.issue("admin", Role::Admin).unwrap();

        let decoded = codec.decode(&issued.token).unwrap();
        assert_eq!(decoded.subject, "admin");
        assert_eq!(decoded.token_id, issued.token_id);
        assert_eq!(decoded.role, Role::Admin);
        assert!(!decoded.token_id.is_empty());
    }

    #[test]
    fn expiry_is_issued_at_plus_ttl() {
        let codec = codec().with_ttl(Duration::from_secs(600));
        let issued = codec.issue_at("u1", Role::Member, 1_000).unwrap();
        assert_eq!(issued.issued_at, 1_000);
        assert_eq!(issued.expires_at, 1_600);
    }

    #[test]
    fn oversized_ttl_saturates_instead_of_wrapping() {
        let codec = codec().with_ttl(Duration::from_secs(u64::MAX));
        assert_eq!(codec.ttl_secs(), i64::MAX);

        let issued = codec.issue_at("u1", Role::Member, 1_000).unwrap();
        assert_eq!(issued.expires_at, i64::MAX);
        let decoded = codec.decode_at(&issued.token, 2_000).unwrap();
        assert_eq!(decoded.expires_at, i64::MAX);
    }

    #[test]
    fn default_ttl_is_twenty_four_hours() {
        let issued = codec().issue("u1", Role::Member).unwrap();
        assert_eq!(issued.expires_at - issued.issued_at, 86_400);
    }

    #[test]
    fn every_issuance_gets_a_fresh_token_id() {
        let codec = codec();
        let a = codec.issue("u1", Role::Member).unwrap();
        let b = codec.issue("u1", Role::Member).unwrap();
        assert_ne!(a.token_id, b.token_id);
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec().with_ttl(Duration::from_secs(60));
        let issued = codec.issue_at("u1", Role::Member, 1_000).unwrap();

        assert!(codec.decode_at(&issued.token, 1_059).is_ok());
        let err = codec.decode_at(&issued.token, 1_060).unwrap_err();
        assert_eq!(
            err,
            TokenError::Expired {
                token_id: issued.token_id.clone(),
                expired_at: 1_060,
            }
        );
        assert!(matches!(
            codec.decode(&issued.token),
            Err(TokenError::Expired { .. })
        ));
    }

    #[test]
    fn zero_ttl_token_is_expired_immediately() {
        let codec = codec().with_ttl(Duration::ZERO);
        let issued = codec.issue("u1", Role::Member).unwrap();
        assert!(matches!(
            codec.decode(&issued.token),
            Err(TokenError::Expired { .. })
        ));
    }

    #[test]
    fn decode_allow_expired_still_verifies_signature() {
        let codec = codec().with_ttl(Duration::ZERO);
        let issued = codec.issue("u1", Role::Member).unwrap();
        let decoded = codec.decode_allow_expired(&issued.token).unwrap();
        assert_eq!(decoded.token_id, issued.token_id);

        let other = TokenCodec::new(b"another-secret-that-is-also-long-enough");
        assert!(matches!(
            other.decode_allow_expired(&issued.token),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn wrong_secret_is_malformed() {
        let issued = codec().issue("u1", Role::Member).unwrap();
        let other = TokenCodec::new(b"another-secret-that-is-also-long-enough");
        assert!(matches!(
            other.decode(&issued.token),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn tampered_payload_is_malformed() {
        let codec = codec();
        let issued = codec.issue("member_1", Role::Member).unwrap();
        let parts: Vec<&str> = issued.token.split('.').collect();

        let forged_claims = format!(
            r#"{{"sub":"member_1","jti":"{}","iat":{},"exp":{},"role":"admin"}}"#,
            issued.token_id, issued.issued_at, issued.expires_at
        );
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            URL_SAFE_NO_PAD.encode(forged_claims.as_bytes()),
            parts[2]
        );

        assert!(matches!(codec.decode(&forged), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn tampered_expired_token_reports_malformed_not_expired() {
        let codec = codec().with_ttl(Duration::ZERO);
        let issued = codec.issue("u1", Role::Member).unwrap();
        let mut forged = issued.token.clone();
        forged.push('x');
        assert!(matches!(codec.decode(&forged), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec();
        for token in ["", "not-a-jwt", "a.b.c", "..."] {
            assert!(
                matches!(codec.decode(token), Err(TokenError::Malformed(_))),
                "expected malformed for {token:?}"
            );
        }
    }

    #[test]
    fn unsigned_token_is_malformed() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD
            .encode(br#"{"sub":"admin","jti":"x","iat":1,"exp":9999999999,"role":"admin"}"#);
        let token = format!("{header}.{claims}.");
        assert!(matches!(codec().decode(&token), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn debug_does_not_print_key_material() {
        let rendered = format!("{:?}", codec());
        assert!(!rendered.contains("test-secret"));
    }
}
