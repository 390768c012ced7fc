// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{
    routes::library_routes, CredentialStore, PublicRoutes, RevocationRegistry, TokenCodec,
};

/// Shared services handed to every handler and middleware.
///
/// The revocation registry is created once in `main` and lives for the whole
/// process; clones of `AppState` share it.
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<TokenCodec>,
    pub revocations: Arc<RevocationRegistry>,
    pub credentials: Arc<dyn CredentialStore>,
    pub routes: Arc<PublicRoutes>,
}

impl AppState {
    pub fn new(
        codec: TokenCodec,
        revocations: Arc<RevocationRegistry>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            codec: Arc::new(codec),
            revocations,
            credentials,
            routes: Arc::new(library_routes()),
        }
    }

    /// Replace the route policy.
    pub fn with_routes(mut self, routes: PublicRoutes) -> Self {
        self.routes = Arc::new(routes);
        self
    }
}
