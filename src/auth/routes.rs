// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route access policy.
//!
//! Two explicit lists, matched on exact method + path:
//!
//! - **exempt**: the authenticator does not run at all (registration).
//! - **public**: the authenticator runs, but an anonymous caller is allowed
//!   through route authorization (login, logout, error path, liveness, docs).
//!
//! Every exempt route is implicitly public. Nothing is inferred from path
//! prefixes except the docs tree, which is listed as a prefix on purpose.

use axum::http::Method;

/// Login endpoint.
pub const LOGIN_PATH: &str = "/v1/auth/login";
/// Logout / self-revocation endpoint.
pub const LOGOUT_PATH: &str = "/v1/auth/logout";
/// Public registration endpoint.
pub const REGISTRATION_PATH: &str = "/v1/users";
/// Generic error path.
pub const ERROR_PATH: &str = "/error";
/// Liveness probe.
pub const LIVENESS_PATH: &str = "/health/live";
/// OpenAPI document and Swagger UI.
pub const DOCS_PREFIX: &str = "/docs";
pub const OPENAPI_PATH: &str = "/api-doc/openapi.json";

#[derive(Debug, Clone, PartialEq, Eq)]
struct RouteRule {
    method: Method,
    path: String,
}

impl RouteRule {
    fn matches(&self, method: &Method, path: &str) -> bool {
        &self.method == method && self.path == path
    }
}

/// Allow-list collaborator consulted by the authenticator and route
/// authorization.
#[derive(Debug, Clone, Default)]
pub struct PublicRoutes {
    exempt: Vec<RouteRule>,
    public: Vec<RouteRule>,
    public_prefixes: Vec<String>,
}

impl PublicRoutes {
    /// Empty policy: every route is protected and nothing is exempt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the authenticator for `method path`. Also makes it public.
    pub fn exempt(mut self, method: Method, path: impl Into<String>) -> Self {
        let rule = RouteRule {
            method,
            path: path.into(),
        };
        self.public.push(rule.clone());
        self.exempt.push(rule);
        self
    }

    /// Allow anonymous callers on `method path`.
    pub fn public(mut self, method: Method, path: impl Into<String>) -> Self {
        self.public.push(RouteRule {
            method,
            path: path.into(),
        });
        self
    }

    /// Allow anonymous callers for any path under `prefix`.
    pub fn public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_prefixes.push(prefix.into());
        self
    }

    pub fn is_exempt(&self, method: &Method, path: &str) -> bool {
        self.exempt.iter().any(|rule| rule.matches(method, path))
    }

    pub fn is_public(&self, method: &Method, path: &str) -> bool {
        self.public.iter().any(|rule| rule.matches(method, path))
            || self
                .public_prefixes
                .iter()
                .any(|prefix| path == prefix || path.starts_with(&format!("{prefix}/")))
    }
}

/// The service's route policy.
pub fn library_routes() -> PublicRoutes {
    PublicRoutes::new()
        .exempt(Method::POST, REGISTRATION_PATH)
        .public(Method::POST, LOGIN_PATH)
        .public(Method::POST, LOGOUT_PATH)
        .public(Method::GET, ERROR_PATH)
        .public(Method::GET, LIVENESS_PATH)
        .public(Method::GET, OPENAPI_PATH)
        .public_prefix(DOCS_PREFIX)
}
