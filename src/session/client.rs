// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the auth endpoints.

use std::future::Future;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use url::Url;

use super::SessionError;
use crate::auth::routes::{LOGIN_PATH, LOGOUT_PATH};
use crate::models::{LoginRequest, LoginResponse, LogoutResponse};

/// Default connect timeout for auth calls.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default overall request timeout for auth calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Server-side revocation of a session token.
pub trait RemoteRevoker: Send + Sync {
    /// Ask the server to revoke `token`.
    fn revoke(&self, token: &str) -> impl Future<Output = Result<(), SessionError>> + Send;
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Thin `reqwest` wrapper around login and logout.
#[derive(Debug, Clone)]
pub struct LibraryClient {
    base_url: Url,
    http: reqwest::Client,
}

impl LibraryClient {
    /// Create a client for the server at `base_url` (e.g. `https://library.example`).
    pub fn new(base_url: &str) -> Result<Self, SessionError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Self::with_http_client(base_url, http)
    }

    /// Create a client that reuses an existing `reqwest::Client`.
    ///
    /// A path on `base_url` is kept as a prefix: `https://host/api` sends
    /// logins to `https://host/api/v1/auth/login`.
    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Result<Self, SessionError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| SessionError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(SessionError::InvalidUrl(format!("{base_url} cannot be a base URL")));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, SessionError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| SessionError::InvalidUrl(e.to_string()))
    }

    /// Exchange nick + password for a token.
    pub async fn login(&self, nick: &str, password: &str) -> Result<LoginResponse, SessionError> {
        let response = self
            .http
            .post(self.endpoint(LOGIN_PATH)?)
            .json(&LoginRequest {
                nick: nick.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    /// Revoke `token` on the server.
    pub async fn logout(&self, token: &str) -> Result<LogoutResponse, SessionError> {
        let response = self
            .http
            .post(self.endpoint(LOGOUT_PATH)?)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }
}

impl RemoteRevoker for LibraryClient {
    async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        match self.logout(token).await {
            Ok(_) => Ok(()),
            Err(SessionError::Transport(e)) => {
                Err(SessionError::RemoteRevocationUnreachable(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SessionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string(),
    };
    Err(SessionError::RemoteRejected {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_resolve_against_base_url() {
        let client = LibraryClient::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(
            client.endpoint(LOGIN_PATH).unwrap().as_str(),
            "http://127.0.0.1:8080/v1/auth/login"
        );
        assert_eq!(
            client.endpoint(LOGOUT_PATH).unwrap().as_str(),
            "http://127.0.0.1:8080/v1/auth/logout"
        );
    }

    #[test]
    fn base_url_path_is_kept_as_prefix() {
        for base in ["https://library.example/api", "https://library.example/api/"] {
            let client = LibraryClient::new(base).unwrap();
            assert_eq!(
                client.endpoint(LOGOUT_PATH).unwrap().as_str(),
                "https://library.example/api/v1/auth/logout"
            );
        }
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            LibraryClient::new("not a url"),
            Err(SessionError::InvalidUrl(_))
        ));
        assert!(matches!(
            LibraryClient::new("mailto:desk@library.example"),
            Err(SessionError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn revoke_against_closed_port_is_unreachable() {
        // Port 1 on loopback is not expected to have a listener.
        let client = LibraryClient::new("http://127.0.0.1:1").unwrap();
        assert!(matches!(
            client.revoke("token").await,
            Err(SessionError::RemoteRevocationUnreachable(_))
        ));
    }
}
